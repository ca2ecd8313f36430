//! Error types for the spreadsheet matching pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`DecodeError`] - spreadsheet/CSV decoding errors
//! - [`ArchiveError`] - ZIP bundling errors
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Join and formatting edge cases (missing columns, unparsable numbers,
//! empty datasets) are intentionally *not* errors: they resolve through
//! the default and sentinel policies in [`crate::export`].

use thiserror::Error;

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while turning uploaded bytes into tabular rows.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to read input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or its first sheet read.
    #[error("Invalid spreadsheet: {0}")]
    Workbook(String),

    /// The file decoded to zero rows.
    #[error("Spreadsheet is empty")]
    EmptySheet,

    /// Text content could not be decoded with the detected encoding.
    #[error("Failed to decode text content: {0}")]
    Encoding(String),
}

// =============================================================================
// Archive Errors
// =============================================================================

/// Errors while bundling named text files into a ZIP.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// IO error while writing archive bytes.
    #[error("Archive IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::compare_bytes`]
/// and the CLI/server entry points built on it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Decoding error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A required input file was not provided.
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// IO error while writing outputs.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Requested file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
