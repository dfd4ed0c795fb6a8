//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - Fetching images and fonts over HTTP or from disk
//! - Error types

pub mod error;
pub mod fetch;
