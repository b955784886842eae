use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::renderer::{DocumentKind, RenderedDocument};

/// Documents at or above this score count as high quality
pub const HIGH_QUALITY_THRESHOLD: f64 = 0.8;

/// Documents below this score need review
pub const REVIEW_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub timestamp: DateTime<Utc>,
    pub summary: ReportSummary,
    pub files: Vec<ReportRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_files: usize,
    pub average_quality: f64,
    pub high_quality: usize,
    pub needs_review: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Relative source path, module name, or `architecture`
    pub path: String,

    #[serde(rename = "type")]
    pub kind: DocumentKind,

    pub quality: f64,

    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub entities: usize,
}

impl QualityReport {
    /// Rows whose quality falls below the review threshold
    pub fn needing_review(&self) -> impl Iterator<Item = &ReportRow> {
        self.files.iter().filter(|row| row.quality < REVIEW_THRESHOLD)
    }
}

/// Summarizes rendered documents into a [`QualityReport`]
#[derive(Debug, Default)]
pub struct QualityReporter;

impl QualityReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, documents: &[RenderedDocument], timestamp: DateTime<Utc>) -> QualityReport {
        let files: Vec<ReportRow> = documents
            .iter()
            .map(|doc| ReportRow {
                path: doc.name.clone(),
                kind: doc.kind,
                quality: doc.metadata.quality,
                confidence: doc.metadata.confidence,
                entities: doc.metadata.entity_count,
            })
            .collect();

        QualityReport {
            timestamp,
            summary: summarize(&files),
            files,
        }
    }
}

fn summarize(rows: &[ReportRow]) -> ReportSummary {
    if rows.is_empty() {
        return ReportSummary::default();
    }

    let total: f64 = rows.iter().map(|row| row.quality).sum();
    ReportSummary {
        total_files: rows.len(),
        average_quality: total / rows.len() as f64,
        high_quality: rows
            .iter()
            .filter(|row| row.quality >= HIGH_QUALITY_THRESHOLD)
            .count(),
        needs_review: rows.iter().filter(|row| row.quality < REVIEW_THRESHOLD).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::renderer::DocumentMetadata;
    use std::path::PathBuf;

    fn doc(name: &str, quality: f64) -> RenderedDocument {
        RenderedDocument {
            kind: DocumentKind::File,
            name: name.to_string(),
            content: String::new(),
            target_path: PathBuf::from(name),
            metadata: DocumentMetadata {
                entity_count: 2,
                quality,
                confidence: 0.5,
            },
        }
    }

    #[test]
    fn test_threshold_boundaries() {
        let docs = vec![doc("a", 0.8), doc("b", 0.7999), doc("c", 0.6), doc("d", 0.59)];
        let report = QualityReporter::new().generate(&docs, Utc::now());

        assert_eq!(report.summary.total_files, 4);
        assert_eq!(report.summary.high_quality, 1);
        assert_eq!(report.summary.needs_review, 1);
        assert_eq!(report.needing_review().next().unwrap().path, "d");
    }

    #[test]
    fn test_empty_document_set_averages_zero() {
        let report = QualityReporter::new().generate(&[], Utc::now());
        assert_eq!(report.summary.total_files, 0);
        assert_eq!(report.summary.average_quality, 0.0);
        assert!(report.files.is_empty());
    }

    #[test]
    fn test_average_and_json_shape() {
        let docs = vec![doc("src/a.ts", 1.0), doc("src/b.ts", 0.5)];
        let report = QualityReporter::new().generate(&docs, Utc::now());
        assert!((report.summary.average_quality - 0.75).abs() < 1e-9);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["totalFiles"], 2);
        assert_eq!(json["summary"]["highQuality"], 1);
        assert_eq!(json["summary"]["needsReview"], 1);
        assert_eq!(json["files"][0]["path"], "src/a.ts");
        assert_eq!(json["files"][0]["type"], "file");
        assert_eq!(json["files"][0]["entities"], 2);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_missing_row_fields_default_to_zero() {
        let row: ReportRow =
            serde_json::from_str(r#"{"path":"x","type":"module","quality":0.9}"#).unwrap();
        assert_eq!(row.confidence, 0.0);
        assert_eq!(row.entities, 0);
        assert_eq!(row.kind, DocumentKind::Module);
    }
}
