//! Services layer - operations over documents.
//!
//! This module contains:
//! - The `.vox` text codec
//! - Image and font registration
//! - Markup rendering
//! - File storage

pub mod assets;
pub mod codec;
pub mod render;
pub mod storage;
