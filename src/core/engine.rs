use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{DocsynthError, Result};
use super::analysis::{ArchitectureSnapshot, CodeEntity, FileAnalysis, Module};
use super::architecture::ArchitectureAnalyzer;
use super::cancel::CancellationFlag;
use super::extractor::PatternRegistry;
use super::file_analyzer::FileAnalyzer;
use super::module_aggregator::ModuleAggregator;
use super::quality::QualityReporter;
use super::renderer::{DocumentRenderer, RenderedDocument};
use super::scanner::DirectoryScanner;
use super::synthesizer::{DescriptionSynthesizer, Descriptions};
use super::templates::{write_builtin_templates, TemplateSet};
use super::writer::DocumentationGenerated;

/// Name of the configuration file written by `init`
pub const CONFIG_FILE: &str = "docsynth.toml";

/// Directory `init` writes the bundled templates into
pub const TEMPLATE_DIR: &str = "templates";

/// Where a run currently is; runs only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Scanning,
    Analyzing,
    Aggregating,
    DetectingArchitecture,
    Synthesizing,
    Rendering,
    Reporting,
    Done,
}

/// Everything computed before rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    pub files: Vec<FileAnalysis>,
    pub modules: Vec<Module>,
    pub architecture: ArchitectureSnapshot,
}

/// Main orchestration engine for one documentation run
pub struct Engine {
    config: Config,
    registry: Arc<PatternRegistry>,
    templates: TemplateSet,
    cancel: CancellationFlag,
    stage: Stage,
    frozen_timestamp: Option<DateTime<Utc>>,
}

impl Engine {
    /// Create an engine from a config file, or the discovered/default configuration
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let registry = Arc::new(PatternRegistry::new()?);
        let templates = TemplateSet::load(&config.templates);

        Ok(Self {
            config,
            registry,
            templates,
            cancel: CancellationFlag::new(),
            stage: Stage::Idle,
            frozen_timestamp: None,
        })
    }

    /// Use a fixed `generated_at` so repeated runs produce identical output
    pub fn with_generated_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.frozen_timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Handle that stops the run at the next file boundary
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// Scan, analyze, aggregate and detect architecture without rendering
    pub async fn analyze(&mut self, source: Option<PathBuf>) -> Result<AnalysisOutput> {
        let source_dir = source.unwrap_or_else(|| self.config.project.source_dir.clone());

        self.enter(Stage::Scanning);
        info!("🔍 Scanning {}", source_dir.display());
        let paths = DirectoryScanner::new(&self.config.scan).scan(&source_dir)?;
        info!("Found {} source files", paths.len());

        self.enter(Stage::Analyzing);
        let files = self.analyze_files(&source_dir, paths).await?;
        info!("📊 Analyzed {} files", files.len());

        self.enter(Stage::Aggregating);
        let synthesizer = DescriptionSynthesizer::new();
        let modules = ModuleAggregator::new(&synthesizer).aggregate(&files);
        info!("📦 Grouped files into {} modules", modules.len());

        self.enter(Stage::DetectingArchitecture);
        let architecture = ArchitectureAnalyzer::new().analyze(&files, &modules);
        info!(
            "🏗️ Detected {} architectural patterns, {} ranked dependencies",
            architecture.patterns.len(),
            architecture.ranking.len()
        );

        Ok(AnalysisOutput {
            files,
            modules,
            architecture,
        })
    }

    /// Run the whole pipeline and return the rendered documents with their report
    pub async fn generate(
        &mut self,
        source: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Result<DocumentationGenerated> {
        let output_dir = output.unwrap_or_else(|| self.config.project.output_dir.clone());
        let generated_at = self.frozen_timestamp.unwrap_or_else(Utc::now);

        info!("📝 Generating documentation into {}", output_dir.display());
        let analysis = self.analyze(source).await?;

        self.enter(Stage::Synthesizing);
        let synthesizer = DescriptionSynthesizer::new();
        let file_descriptions: Vec<Descriptions> = analysis
            .files
            .iter()
            .map(|file| synthesizer.describe_entities(&file.entities))
            .collect();
        let all_entities: Vec<CodeEntity> = analysis
            .files
            .iter()
            .flat_map(|file| file.entities.iter().cloned())
            .collect();
        let snapshot = &analysis.architecture;
        let architecture_descriptions = Descriptions {
            overview: synthesizer.describe_architecture(
                &self.config.project.name,
                snapshot.modules.len(),
                snapshot.total_files,
                &snapshot.patterns,
                &all_entities,
            ),
            entities: Vec::new(),
        };

        self.enter(Stage::Rendering);
        let documentation = self.render_all(
            &analysis,
            &file_descriptions,
            &all_entities,
            &architecture_descriptions,
            &output_dir,
            &generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;

        self.enter(Stage::Reporting);
        let quality_report = QualityReporter::new().generate(&documentation, generated_at);
        info!(
            "📋 Quality: {} documents, average {:.2}, {} high quality, {} need review",
            quality_report.summary.total_files,
            quality_report.summary.average_quality,
            quality_report.summary.high_quality,
            quality_report.summary.needs_review
        );

        self.enter(Stage::Done);
        info!("🎉 Documentation generation complete!");

        Ok(DocumentationGenerated {
            documentation,
            quality_report,
        })
    }

    /// Write the default configuration and bundled templates into `target`
    pub fn init(&self, target: &Path, force: bool) -> Result<Vec<PathBuf>> {
        info!("Initializing docsynth in: {}", target.display());
        std::fs::create_dir_all(target)?;

        let config_path = target.join(CONFIG_FILE);
        if config_path.exists() && !force {
            return Err(DocsynthError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            )));
        }

        let mut config = self.config.clone();
        config.templates.template_dir = Some(PathBuf::from(TEMPLATE_DIR));
        config.save(&config_path)?;

        let mut written = vec![config_path];
        written.extend(write_builtin_templates(&target.join(TEMPLATE_DIR), force)?);
        info!("✅ Wrote {} files", written.len());
        Ok(written)
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Per-file failures are logged and dropped; cancellation aborts the run
    async fn analyze_files(&self, root: &Path, paths: Vec<PathBuf>) -> Result<Vec<FileAnalysis>> {
        let analyzer = Arc::new(FileAnalyzer::new(
            Arc::clone(&self.registry),
            self.config.scan.max_file_size,
        ));

        if !self.config.generation.parallel {
            let mut files = Vec::with_capacity(paths.len());
            for path in paths {
                self.cancel.check()?;
                match analyzer.analyze(&path, root) {
                    Ok(analysis) => files.push(analysis),
                    Err(e) => warn!("⚠️ Skipping {}: {}", path.display(), e),
                }
            }
            return Ok(files);
        }

        let mut tasks = JoinSet::new();
        for (index, path) in paths.into_iter().enumerate() {
            self.cancel.check()?;
            let analyzer = Arc::clone(&analyzer);
            let cancel = self.cancel.clone();
            let root = root.to_path_buf();
            tasks.spawn_blocking(move || {
                let result = cancel
                    .check()
                    .and_then(|_| analyzer.analyze(&path, &root));
                (index, path, result)
            });
        }

        let mut indexed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(analysis))) => indexed.push((index, analysis)),
                Ok((_, _, Err(DocsynthError::Cancelled))) => return Err(DocsynthError::Cancelled),
                Ok((_, path, Err(e))) => warn!("⚠️ Skipping {}: {}", path.display(), e),
                Err(e) => warn!("⚠️ Analysis task failed: {}", e),
            }
        }
        self.cancel.check()?;

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, analysis)| analysis).collect())
    }

    fn render_all(
        &self,
        analysis: &AnalysisOutput,
        file_descriptions: &[Descriptions],
        all_entities: &[CodeEntity],
        architecture_descriptions: &Descriptions,
        output_dir: &Path,
        generated_at: &str,
    ) -> Result<Vec<RenderedDocument>> {
        let renderer = DocumentRenderer::new(&self.templates, output_dir, generated_at)?;
        let mut documentation = Vec::new();

        for (file, descriptions) in analysis.files.iter().zip(file_descriptions) {
            self.cancel.check()?;
            match renderer.render_file(file, descriptions) {
                Ok(Some(document)) => documentation.push(document),
                Ok(None) => {}
                Err(e) => warn!("⚠️ Failed to render {}: {}", file.relative_path.display(), e),
            }
        }

        if self.config.generation.generate_modules {
            for module in &analysis.modules {
                let descriptions = Descriptions {
                    overview: module.description.clone(),
                    entities: Vec::new(),
                };
                match renderer.render_module(module, &descriptions) {
                    Ok(Some(document)) => documentation.push(document),
                    Ok(None) => {}
                    Err(e) => warn!("⚠️ Failed to render module {}: {}", module.name, e),
                }
            }
        }

        if self.config.generation.generate_architecture {
            match renderer.render_architecture(
                &self.config.project.name,
                &analysis.architecture,
                &analysis.modules,
                all_entities,
                architecture_descriptions,
            ) {
                Ok(Some(document)) => documentation.push(document),
                Ok(None) => {}
                Err(e) => warn!("⚠️ Failed to render architecture overview: {}", e),
            }
        }

        info!("Rendered {} documents", documentation.len());
        Ok(documentation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_for(parallel: bool) -> Engine {
        let mut config = Config::default();
        config.generation.parallel = parallel;
        Engine::from_config(config).unwrap()
    }

    fn write(root: &Path, relative: &str, text: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[tokio::test]
    async fn test_parallel_and_sequential_agree_on_order() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..12 {
            write(dir.path(), &format!("src/m{}/f{}.js", i % 3, i), "function f(a) {}\n");
        }

        let parallel = engine_for(true)
            .analyze(Some(dir.path().to_path_buf()))
            .await
            .unwrap();
        let sequential = engine_for(false)
            .analyze(Some(dir.path().to_path_buf()))
            .await
            .unwrap();

        let order = |out: &AnalysisOutput| -> Vec<PathBuf> {
            out.files.iter().map(|f| f.relative_path.clone()).collect()
        };
        assert_eq!(parallel.files.len(), 12);
        assert_eq!(order(&parallel), order(&sequential));
    }

    #[tokio::test]
    async fn test_stage_reaches_done() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/app/main.ts", "export function main() {}\n");

        let mut engine = engine_for(false);
        assert_eq!(engine.stage(), Stage::Idle);
        let result = engine
            .generate(Some(dir.path().to_path_buf()), Some(dir.path().join("docs")))
            .await
            .unwrap();

        assert_eq!(engine.stage(), Stage::Done);
        // one file, one module, one architecture document
        assert_eq!(result.documentation.len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_run_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.js", "function a() {}\n");

        for parallel in [true, false] {
            let mut engine = engine_for(parallel);
            engine.cancellation_flag().cancel();
            let result = engine.generate(Some(dir.path().to_path_buf()), None).await;
            assert!(matches!(result, Err(DocsynthError::Cancelled)));
        }
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = engine_for(true)
            .analyze(Some(dir.path().join("nope")))
            .await;
        assert!(matches!(result, Err(DocsynthError::FileSystem(_))));
    }

    #[test]
    fn test_init_writes_config_and_templates() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_for(true);

        let written = engine.init(dir.path(), false).unwrap();
        assert_eq!(written.len(), 6);
        let config = Config::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.templates.template_dir, Some(PathBuf::from(TEMPLATE_DIR)));
        assert!(dir.path().join("templates/module.md").exists());

        assert!(matches!(
            engine.init(dir.path(), false),
            Err(DocsynthError::Config(_))
        ));
        assert!(engine.init(dir.path(), true).is_ok());
    }
}
