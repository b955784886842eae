use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use super::quality::QualityReport;
use super::renderer::RenderedDocument;

/// File name of the JSON quality report inside the output directory
pub const QUALITY_REPORT_FILE: &str = "quality-report.json";

/// Payload emitted once per completed run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationGenerated {
    pub documentation: Vec<RenderedDocument>,
    pub quality_report: QualityReport,
}

/// Destination for a finished run
pub trait DocumentSink {
    /// Persist the payload, returning every path written
    fn write(&self, payload: &DocumentationGenerated) -> Result<Vec<PathBuf>>;
}

/// Writes documents to their routed paths and the report beside them
#[derive(Debug, Clone)]
pub struct FsDocumentWriter {
    output_dir: PathBuf,
}

impl FsDocumentWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(QUALITY_REPORT_FILE)
    }
}

impl DocumentSink for FsDocumentWriter {
    fn write(&self, payload: &DocumentationGenerated) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(payload.documentation.len() + 1);

        for document in &payload.documentation {
            if let Some(parent) = document.target_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&document.target_path, &document.content)?;
            debug!("Wrote {}", document.target_path.display());
            written.push(document.target_path.clone());
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let report_path = self.report_path();
        let report = serde_json::to_string_pretty(&payload.quality_report)?;
        std::fs::write(&report_path, report)?;
        written.push(report_path);

        info!(
            "💾 Wrote {} documents to {}",
            payload.documentation.len(),
            self.output_dir.display()
        );
        Ok(written)
    }
}
