mod analysis;
mod architecture;
mod cancel;
mod engine;
mod extractor;
mod file_analyzer;
mod module_aggregator;
mod quality;
mod renderer;
mod scanner;
mod synthesizer;
mod templates;
mod writer;

pub use analysis::{
    ArchitecturalPattern, ArchitectureSnapshot, CodeEntity, Complexity, Dependency,
    DependencyKind, DependencyUsage, EntityKind, FileAnalysis, Module, SourceFile,
};
pub use architecture::{
    detect_patterns, render_dependency_graph, sanitize_node_id, ArchitectureAnalyzer,
    DependencyUsageMap, DIAGRAM_LIMIT, RANKING_LIMIT,
};
pub use cancel::CancellationFlag;
pub use extractor::{
    context_window, EntityExtractor, ExtractionPattern, Extraction, PatternKind, PatternRegistry,
    CONTEXT_RADIUS,
};
pub use file_analyzer::{calculate_complexity, calculate_quality, detect_language, FileAnalyzer};
pub use module_aggregator::{determine_module_name, ModuleAggregator, ROOT_MODULE};
pub use quality::{
    QualityReport, QualityReporter, ReportRow, ReportSummary, HIGH_QUALITY_THRESHOLD,
    REVIEW_THRESHOLD,
};
pub use renderer::{
    assess_quality, calculate_confidence, select_file_template, DocumentKind, DocumentMetadata,
    DocumentRenderer, RenderedDocument, TemplateData, DEVELOPMENT_DIR, REFERENCES_DIR,
};
pub use scanner::DirectoryScanner;
pub use synthesizer::{DescriptionSynthesizer, Descriptions, EntityDescription};
pub use templates::{write_builtin_templates, TemplateKind, TemplateSet};
pub use writer::{DocumentSink, DocumentationGenerated, FsDocumentWriter, QUALITY_REPORT_FILE};

// Export the main engine
pub use engine::{AnalysisOutput, Engine, Stage, CONFIG_FILE, TEMPLATE_DIR};
