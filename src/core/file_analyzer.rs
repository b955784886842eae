use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{DocsynthError, Result};
use super::analysis::{FileAnalysis, SourceFile};
use super::extractor::{EntityExtractor, PatternRegistry};

/// Reads a source file and turns it into a [`FileAnalysis`]
pub struct FileAnalyzer {
    extractor: EntityExtractor,
    max_file_size: usize,
}

impl FileAnalyzer {
    pub fn new(registry: Arc<PatternRegistry>, max_file_size: usize) -> Self {
        Self {
            extractor: EntityExtractor::new(registry),
            max_file_size,
        }
    }

    /// Read and analyze one file; `root` is the scan root used for relative paths
    pub fn analyze(&self, path: &Path, root: &Path) -> Result<FileAnalysis> {
        let source = self.read_source(path, root)?;
        Ok(self.analyze_source(&source))
    }

    pub fn read_source(&self, path: &Path, root: &Path) -> Result<SourceFile> {
        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size as u64 {
            return Err(DocsynthError::Analysis {
                path: path.to_path_buf(),
                message: format!("file exceeds maximum size limit ({} bytes)", self.max_file_size),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| DocsynthError::Analysis {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();

        Ok(SourceFile {
            path: path.to_path_buf(),
            relative_path,
            line_count: text.lines().count(),
            language: detect_language(path).to_string(),
            content_hash: calculate_hash(&text),
            text,
        })
    }

    pub fn analyze_source(&self, source: &SourceFile) -> FileAnalysis {
        let extraction = self.extractor.extract(&source.text);

        FileAnalysis {
            path: source.path.clone(),
            relative_path: source.relative_path.clone(),
            language: source.language.clone(),
            line_count: source.line_count,
            content_hash: source.content_hash.clone(),
            entities: extraction.entities,
            dependencies: extraction.dependencies,
            complexity: calculate_complexity(&source.text),
            quality: calculate_quality(&source.text),
        }
    }
}

/// Language label for a path's extension
pub fn detect_language(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js") | Some("jsx") => "JavaScript",
        Some("ts") | Some("tsx") => "TypeScript",
        Some("py") => "Python",
        Some("java") => "Java",
        _ => "Unknown",
    }
}

/// One point per line for each branching keyword family it contains
pub fn calculate_complexity(text: &str) -> u32 {
    text.lines()
        .map(|line| {
            let mut score = 0;
            if line.contains("if ") {
                score += 1;
            }
            if line.contains("for ") || line.contains("while ") {
                score += 1;
            }
            if line.contains("switch ") {
                score += 1;
            }
            if line.contains("catch ") {
                score += 1;
            }
            score
        })
        .sum()
}

/// Starts at 1.0 and loses 0.1 per hygiene smell, never below 0.0
pub fn calculate_quality(text: &str) -> f64 {
    let mut score: f64 = 1.0;
    if text.contains("console.log") {
        score -= 0.1;
    }
    if text.contains("TODO") || text.contains("FIXME") {
        score -= 0.1;
    }
    if text.contains("var ") {
        score -= 0.1;
    }
    score.max(0.0)
}

fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
