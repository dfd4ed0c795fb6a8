use thiserror::Error;

/// A structural violation in a `.vox` file. Always fatal to the parse call.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number of the offending line (0 when it cannot be known).
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("invalid JSON argument for {command}: {message}")]
    InvalidJson { command: String, message: String },

    #[error("unterminated quoted command")]
    UnterminatedCommand,

    #[error("duplicate {0} block")]
    DuplicateBlock(String),

    #[error("unknown command {command:?} in {context}")]
    UnknownCommand { command: String, context: String },

    #[error("missing {child} block in {parent}")]
    MissingBlock { parent: String, child: String },

    #[error("{command} expects {expected}")]
    InvalidArgument { command: String, expected: String },

    #[error("{0} must not have a body")]
    UnexpectedBody(String),

    #[error("duplicate attribute {0:?}")]
    DuplicateAttribute(String),

    #[error("duplicate lookup source {0:?}")]
    DuplicateLookup(String),

    #[error("duplicate theme key {0}")]
    DuplicateThemeKey(String),

    #[error("duplicate font {0:?}")]
    DuplicateFont(String),

    #[error("unknown theme key {0}")]
    UnknownThemeKey(String),

    #[error("theme key {key} expects a {expected} value")]
    ThemeTypeMismatch { key: String, expected: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThemeError {
    #[error("theme key {key} expects a {expected} value, got {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },

    #[error("default base font size must not use a relative unit")]
    RelativeBaseFontSize,

    #[error("default {key} names unknown font {font:?}")]
    UnknownDefaultFont { key: String, font: String },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] minreq::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported source {0:?}")]
    UnsupportedSource(String),
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to fetch {source_name}: {error}")]
    Fetch {
        source_name: String,
        #[source]
        error: FetchError,
    },

    #[error("invalid font data for {0:?}")]
    InvalidFontData(String),

    #[error("font name {0:?} is reserved")]
    ReservedFont(String),

    #[error("font {0:?} already exists")]
    FontExists(String),

    #[error("font {0:?} does not exist")]
    MissingFont(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("operation {index} has zero length")]
    EmptyOperation { index: usize },

    #[error(transparent)]
    Theme(#[from] ThemeError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("no template for attribute {0:?}")]
    UnknownAttribute(String),

    #[error("invalid value for attribute {name:?}: {value}")]
    InvalidAttribute { name: String, value: String },

    #[error("embed must have exactly one key, found {0}")]
    InvalidEmbed(usize),

    #[error("no template for embed {0:?}")]
    UnknownEmbed(String),

    #[error("image {0} does not exist")]
    MissingImage(u64),

    #[error("{0} operation cannot be rendered")]
    UnexpectedOperation(&'static str),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(4, ParseErrorKind::DuplicateBlock("theme".to_string()));
        assert_eq!(err.to_string(), "line 4: duplicate theme block");

        let err = ParseError::new(9, ParseErrorKind::DuplicateAttribute("bold".to_string()));
        assert_eq!(err.to_string(), "line 9: duplicate attribute \"bold\"");
    }

    #[test]
    fn test_error_display() {
        let err: AppError = RenderError::UnknownAttribute("mention".to_string()).into();
        assert_eq!(err.to_string(), "Render error: no template for attribute \"mention\"");

        let err: AppError = AssetError::ReservedFont("serif".to_string()).into();
        assert_eq!(err.to_string(), "Asset error: font name \"serif\" is reserved");
    }
}
