//! Image and font registration.
//!
//! Inline `data:` images are deduplicated by content. External sources are
//! deduplicated by their source string only, so two URLs serving the same
//! bytes still get two ids. Nothing is modified when a fetch fails.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::app::domain::assets::ImageData;
use crate::app::domain::document::Document;
use crate::app::domain::theme::BuiltinFont;
use crate::app::infrastructure::error::AssetError;
use crate::app::infrastructure::fetch::{AssetFetcher, mime_from_extension};

static FONT_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:font/(?:ttf|otf);base64,[A-Za-z0-9+/]+={0,2}$").expect("font data pattern is valid")
});

pub fn is_valid_font_data(data: &str) -> bool {
    FONT_DATA.is_match(data)
}

fn is_data_uri(source: &str) -> bool {
    source.starts_with("data:")
}

/// Stores an image and returns its id, reusing an existing entry when possible.
pub fn register_image(
    doc: &mut Document,
    source: &str,
    fetcher: &dyn AssetFetcher,
) -> Result<usize, AssetError> {
    if is_data_uri(source) {
        if let Some(id) = doc.images.find(source) {
            log::debug!("inline image already stored as {}", id);
            return Ok(id);
        }
        let id = doc.images.push(ImageData::new(source));
        log::info!("registered inline image {}", id);
        return Ok(id);
    }

    if let Some(&id) = doc.images.lookup.get(source) {
        log::debug!("{} already stored as {}", source, id);
        return Ok(id);
    }

    let fetched = fetcher.fetch(source).map_err(|error| AssetError::Fetch {
        source_name: source.to_string(),
        error,
    })?;
    let id = doc.images.push(ImageData::new(fetched.to_data_uri()));
    doc.images.lookup.insert(source.to_string(), id);
    log::info!("registered image {} from {}", id, source);
    Ok(id)
}

pub fn has_image(doc: &Document, id: usize) -> bool {
    doc.images.contains(id)
}

fn check_new_font_name(doc: &Document, name: &str) -> Result<(), AssetError> {
    if BuiltinFont::is_reserved(name) {
        return Err(AssetError::ReservedFont(name.to_string()));
    }
    if doc.fonts.contains_key(name) {
        return Err(AssetError::FontExists(name.to_string()));
    }
    Ok(())
}

fn check_existing_font(doc: &Document, name: &str) -> Result<(), AssetError> {
    if BuiltinFont::is_reserved(name) {
        return Err(AssetError::ReservedFont(name.to_string()));
    }
    if !doc.fonts.contains_key(name) {
        return Err(AssetError::MissingFont(name.to_string()));
    }
    Ok(())
}

/// Adds a custom font from a `data:font/(ttf|otf);base64,` URI.
pub fn register_font_data(doc: &mut Document, name: &str, data: &str) -> Result<(), AssetError> {
    if !is_valid_font_data(data) {
        return Err(AssetError::InvalidFontData(name.to_string()));
    }
    check_new_font_name(doc, name)?;
    doc.fonts.insert(name.to_string(), data.to_string());
    log::info!("registered font {:?}", name);
    Ok(())
}

/// Fetches a `.ttf`/`.otf` file and registers it under `name`.
pub fn register_font_file(
    doc: &mut Document,
    name: &str,
    source: &str,
    fetcher: &dyn AssetFetcher,
) -> Result<(), AssetError> {
    check_new_font_name(doc, name)?;
    let mut fetched = fetcher.fetch(source).map_err(|error| AssetError::Fetch {
        source_name: source.to_string(),
        error,
    })?;
    if !fetched.mime.starts_with("font/") {
        fetched.mime = mime_from_extension(source).to_string();
    }
    register_font_data(doc, name, &fetched.to_data_uri())
}

/// Renames a custom font and repoints theme keys that used it.
pub fn rename_font(doc: &mut Document, old: &str, new: &str) -> Result<(), AssetError> {
    check_existing_font(doc, old)?;
    check_new_font_name(doc, new)?;
    if let Some(data) = doc.fonts.remove(old) {
        doc.fonts.insert(new.to_string(), data);
    }
    let changed = doc.theme.rename_font(old, new);
    log::info!("renamed font {:?} to {:?} ({} theme keys)", old, new, changed);
    Ok(())
}

/// Removes a custom font. Theme keys that used it fall back to defaults.
pub fn delete_font(doc: &mut Document, name: &str) -> Result<(), AssetError> {
    check_existing_font(doc, name)?;
    doc.fonts.remove(name);
    let cleared = doc.theme.clear_font(name);
    log::info!("deleted font {:?} ({} theme keys reset)", name, cleared.len());
    Ok(())
}
