//! # excel-matcher - product sheet comparison and export
//!
//! Joins product spreadsheets on a shared product code and exports the
//! matched rows as fixed-layout text files for a legacy inventory terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Sheet files │──▶│   Decoder   │──▶│   Matcher    │──▶│   Exporter   │
//! │ (xlsx/csv)  │   │ (typed rows)│   │(join+locate) │   │(3 layouts+zip)│
//! └─────────────┘   └─────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use excel_matcher::{compare_bytes, export::INVENTORY};
//!
//! let result = compare_bytes(&primary_bytes, &catalog_bytes, None)?;
//! println!("{} matches", result.match_count());
//! let estoque = result.export(&INVENTORY);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (MatchedRow, LocatedRow, column names)
//! - [`decoder`] - Spreadsheet/CSV decoding with auto-detection
//! - [`matcher`] - Join and location classification
//! - [`export`] - Schemas, projection and manifests
//! - [`archive`] - ZIP bundling
//! - [`pipeline`] - High-level compare API
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Decoding
pub mod decoder;

// Matching
pub mod matcher;

// Export
pub mod archive;
pub mod export;

// Orchestration
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ArchiveError, DecodeError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{columns, LocatedRow, MatchedRow, NO_LOCATION};

// =============================================================================
// Re-exports - Decoder
// =============================================================================

pub use decoder::{decode_bytes, decode_file, DecodedSheet, SheetFormat};

// =============================================================================
// Re-exports - Matcher
// =============================================================================

pub use matcher::{assign_locations, match_rows};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::manifest::{build_manifest, NamedBlob};
pub use export::{normalize_amount, project, Schema, AUDIT, CURRENT_PRODUCTS, INVENTORY, SCHEMAS};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{compare_bytes, compare_sheets, CompareResult, SheetSummary};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
