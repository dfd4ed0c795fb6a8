//! Application layer.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Delta, Document, Theme, asset tables, Settings)
//! - `services/` - Operations over documents (codec, asset registry, rendering, storage)
//! - `infrastructure/` - External integrations (asset fetching, error types)

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-exports for convenient external access
pub use domain::{Delta, Document, Operation, Settings, Theme};
pub use infrastructure::error::{AppError, ParseError, RenderError, Result};
pub use infrastructure::fetch::{AssetFetcher, DefaultFetcher};
pub use services::render::Renderer;
