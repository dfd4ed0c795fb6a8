//! Rich-text documents stored as `.vox` files and rendered to HTML or Markdown.

pub mod app;

pub use app::domain::{Document, Operation, Settings};
pub use app::infrastructure::error::{AppError, Result};
pub use app::services::codec::{parse, write};
pub use app::services::render::{Renderer, render};
