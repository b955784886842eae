use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A scanned source file, read once and never mutated
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as discovered by the scanner (root-prefixed)
    pub path: PathBuf,

    /// Path relative to the scan root
    pub relative_path: PathBuf,

    /// Raw file text
    pub text: String,

    /// Number of lines in the text
    pub line_count: usize,

    /// Language label derived from the extension
    pub language: String,

    /// SHA-256 of the text
    pub content_hash: String,
}

/// A recognized code construct produced by one extraction pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeEntity {
    pub name: String,

    /// Kind-specific payload
    pub kind: EntityKind,

    pub complexity: Complexity,

    /// Byte offset of the match in the file text
    pub offset: usize,

    /// 1-based line of the match
    pub line: usize,

    /// Text window around the match
    pub context: String,

    /// Comments found above the entity, in source order
    pub comments: Vec<String>,

    /// Every dependency occurrence of the file, as records owned by this entity
    pub dependencies: Vec<Arc<Dependency>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntityKind {
    Function {
        params: Vec<String>,
    },
    Class {
        extends: Option<String>,
        methods: Vec<String>,
        properties: Vec<String>,
    },
    Component {
        props: Vec<String>,
        state: Vec<String>,
        methods: Vec<String>,
    },
    /// Business-logic unit. No extraction pattern produces this kind yet.
    Service,
}

impl EntityKind {
    /// Lowercase label used in prose and tallies
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Function { .. } => "function",
            EntityKind::Class { .. } => "class",
            EntityKind::Component { .. } => "component",
            EntityKind::Service => "service",
        }
    }

    /// Parameter list for functions, empty for every other kind
    pub fn params(&self) -> &[String] {
        match self {
            EntityKind::Function { params } => params,
            _ => &[],
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, EntityKind::Component { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self, EntityKind::Service)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Function { .. } => "Function",
            EntityKind::Class { .. } => "Class",
            EntityKind::Component { .. } => "Component",
            EntityKind::Service => "Service",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Bucket a parameter count: up to 2 is low, 3 to 5 medium, more is high
    pub fn from_param_count(count: usize) -> Self {
        match count {
            0..=2 => Complexity::Low,
            3..=5 => Complexity::Medium,
            _ => Complexity::High,
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        };
        f.write_str(name)
    }
}

/// One import/require occurrence in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub module: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Import,
    Require,
}

/// Per-file analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// Path as discovered by the scanner
    pub path: PathBuf,

    /// Path relative to the scan root
    pub relative_path: PathBuf,

    pub language: String,

    pub line_count: usize,

    pub content_hash: String,

    /// Entities in pattern-registry order, then match order
    pub entities: Vec<CodeEntity>,

    /// Every dependency occurrence in the file, duplicates included
    pub dependencies: Vec<Arc<Dependency>>,

    /// Count of branching lines
    pub complexity: u32,

    /// Heuristic code hygiene score in [0, 1]
    pub quality: f64,
}

impl FileAnalysis {
    /// Scanned path as a forward-slash string, used by path heuristics
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// Files grouped under an inferred module name
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub name: String,

    /// Member files in discovery order
    pub files: Vec<PathBuf>,

    /// Member entities in file-then-match order
    pub entities: Vec<CodeEntity>,

    /// Dependency records, collapsed only when they are the same record
    pub dependencies: Vec<Arc<Dependency>>,

    pub description: String,
}

impl Module {
    pub fn components(&self) -> impl Iterator<Item = &CodeEntity> {
        self.entities.iter().filter(|e| e.kind.is_component())
    }

    pub fn services(&self) -> impl Iterator<Item = &CodeEntity> {
        self.entities.iter().filter(|e| e.kind.is_service())
    }
}

/// Module name and the files consuming it, in first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyUsage {
    pub module: String,
    pub consumers: Vec<PathBuf>,
}

impl DependencyUsage {
    /// Per-occurrence usage count
    pub fn count(&self) -> usize {
        self.consumers.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArchitecturalPattern {
    Mvc,
    ServiceLayer,
    Repository,
}

impl ArchitecturalPattern {
    pub fn name(&self) -> &'static str {
        match self {
            ArchitecturalPattern::Mvc => "MVC",
            ArchitecturalPattern::ServiceLayer => "Service Layer",
            ArchitecturalPattern::Repository => "Repository",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ArchitecturalPattern::Mvc => {
                "Model-View-Controller separation of data, presentation and request handling"
            }
            ArchitecturalPattern::ServiceLayer => {
                "Business logic is grouped into dedicated service modules"
            }
            ArchitecturalPattern::Repository => {
                "Data access is abstracted behind repository modules"
            }
        }
    }
}

/// Whole-project aggregate for one run
#[derive(Debug, Clone, Serialize)]
pub struct ArchitectureSnapshot {
    pub modules: Vec<String>,

    /// Top dependencies by usage count, descending
    pub ranking: Vec<DependencyUsage>,

    /// Leading entries of the insertion-order usage map, drawn in the graph
    pub diagram: Vec<DependencyUsage>,

    pub patterns: Vec<ArchitecturalPattern>,

    pub total_files: usize,

    pub total_entities: usize,
}
