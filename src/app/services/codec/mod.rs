//! The `.vox` text format.
//!
//! Each line is `<command> [json-arg]`, indented with tabs. A line's body is
//! the run of deeper-indented lines right after it. Blank lines carry no
//! meaning. The root holds up to five blocks, each at most once:
//!
//! ```text
//! theme
//! 	baseFontSize {"pt":11.0}
//! delta
//! 	I "Hello"
//! 		bold true
//! 	I "\n"
//! 		header 1
//! images
//! 	lookup
//! 		"https://example.test/cat.png" 0
//! 	data
//! 		-1402535130 "data:image/png;base64,..."
//! fonts
//! 	Lato "data:font/ttf;base64,..."
//! history
//! 	undo
//! 		@ [0,5]
//! 			I "Hello"
//! 	redo
//! ```

pub mod block;
pub mod reader;
pub mod writer;

pub use block::{Block, parse_blocks};
pub use reader::parse;
pub use writer::write;

/// File extension for documents in this format.
pub const EXTENSION: &str = "vox";
