//! REST API types for frontend integration.
//!
//! All bodies are camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::export::{AUDIT, CURRENT_PRODUCTS, INVENTORY};
use crate::pipeline::{CompareResult, SheetSummary};

/// Response sent after a successful process run: the generated files,
/// previews and counts the frontend renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "warning" (no rows matched)
    pub status: String,

    /// Number of matched rows
    pub match_count: usize,

    /// Distinct location labels (empty without a location file)
    pub locations: Vec<String>,

    /// Generated filenames, ready for the download endpoints
    pub files: SchemaFiles,

    /// First lines of each generated file
    pub previews: SchemaPreviews,

    /// Data line counts of each generated file
    pub total_lines: SchemaTotals,

    /// Metadata about the decoded inputs
    pub metadata: ProcessMetadata,
}

/// One value per output schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFiles {
    pub estoque: String,
    pub conferencia: String,
    pub produtos: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPreviews {
    pub estoque: Vec<String>,
    pub conferencia: Vec<String>,
    pub produtos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTotals {
    pub estoque: usize,
    pub conferencia: usize,
    pub produtos: usize,
}

/// Decoded-input metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetadata {
    pub primary: SheetMetadata,
    pub catalog: SheetMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<SheetMetadata>,
}

/// Shape of one decoded input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMetadata {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub format: String,
}

impl From<&SheetSummary> for SheetMetadata {
    fn from(summary: &SheetSummary) -> Self {
        Self {
            row_count: summary.row_count,
            columns: summary.headers.clone(),
            format: summary.format.clone(),
        }
    }
}

impl ProcessResponse {
    /// Assemble the response from a pipeline run and the filenames its
    /// outputs were written under.
    pub fn from_result(result: &CompareResult, files: SchemaFiles) -> Self {
        let match_count = result.match_count();

        ProcessResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if match_count > 0 { "ready" } else { "warning" }.to_string(),
            match_count,
            locations: result.locations.clone(),
            files,
            previews: SchemaPreviews {
                estoque: result.preview(&INVENTORY),
                conferencia: result.preview(&AUDIT),
                produtos: result.preview(&CURRENT_PRODUCTS),
            },
            total_lines: SchemaTotals {
                estoque: match_count,
                conferencia: match_count,
                produtos: match_count,
            },
            metadata: ProcessMetadata {
                primary: (&result.primary).into(),
                catalog: (&result.catalog).into(),
                locations: result.location_sheet.as_ref().map(SheetMetadata::from),
            },
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
