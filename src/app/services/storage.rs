//! Reading and writing `.vox` files.

use std::fs;
use std::path::Path;

use crate::app::domain::document::Document;
use crate::app::infrastructure::error::Result;
use crate::app::services::codec;

const UNTITLED: &str = "Untitled";

/// Document title derived from a file name, without the extension.
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty() && *stem != ".")
        .map(|stem| stem.to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}

pub fn load_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)?;
    let mut doc = codec::parse(&text)?;
    doc.title = Some(title_from_path(path));
    log::info!(
        "loaded {} ({} ops, {} images, {} fonts)",
        path.display(),
        doc.operations.ops().len(),
        doc.images.len(),
        doc.fonts.len()
    );
    Ok(doc)
}

/// Writes the document, creating parent directories as needed.
pub fn save_document(doc: &Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = codec::write(doc);
    fs::write(path, &text)?;
    log::info!("saved {} ({} bytes)", path.display(), text.len());
    Ok(())
}
