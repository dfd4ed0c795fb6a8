//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Delta operations and composition
//! - Document, history and snapshots
//! - Theme properties and unit conversion
//! - Image and font tables
//! - Persisted settings

pub mod assets;
pub mod delta;
pub mod document;
pub mod settings;
pub mod theme;

pub use assets::{FontTable, ImageData, ImageTable};
pub use delta::{AttributeMap, Delta, InsertValue, Operation};
pub use document::{Document, History, SelectionRange, Snapshot, StackItem};
pub use settings::{OutputFormat, PostProcess, Settings};
pub use theme::{
    BuiltinFont, Color, Dimensions, Font, Length, LengthUnit, PropertyType, Theme, ThemeKey,
    ThemeValue,
};
