use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{DocsynthError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Directory scanning rules
    pub scan: ScanConfig,

    /// Template lookup table
    pub templates: TemplateConfig,

    /// Documentation generation settings
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used as the architecture document title
    pub name: String,

    /// Source directory to analyze
    pub source_dir: PathBuf,

    /// Documentation output directory
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names that are never descended into
    pub skip_dirs: Vec<String>,

    /// File extensions (without the dot) that are analyzed
    pub extensions: Vec<String>,

    /// Abort the run on the first traversal error instead of skipping the entry
    pub fail_on_error: bool,

    /// Maximum file size to analyze (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory searched for `<kind>.md` templates
    pub template_dir: Option<PathBuf>,

    /// Explicit template file per kind (component, service, api, module, architecture)
    pub paths: BTreeMap<String, PathBuf>,

    /// Use the bundled templates for kinds that resolve to nothing on disk
    pub builtin_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Analyze files on the blocking thread pool
    pub parallel: bool,

    /// Whether to render per-module documents
    pub generate_modules: bool,

    /// Whether to render the architecture overview
    pub generate_architecture: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Project".to_string(),
            source_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("docs"),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_dirs: ["node_modules", ".git", "dist", "build", "coverage", ".next"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extensions: ["js", "ts", "jsx", "tsx", "py", "java"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fail_on_error: false,
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            paths: BTreeMap::new(),
            builtin_fallback: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            generate_modules: true,
            generate_architecture: true,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| DocsynthError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DocsynthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(DocsynthError::Config(format!(
                        "configuration file not found: {}",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                let candidates = ["Docsynth.toml", "docsynth.toml", ".docsynth.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
