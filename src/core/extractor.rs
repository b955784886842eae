//! Regex-driven entity extraction.
//!
//! Every pattern in the [`PatternRegistry`] is run independently over the full
//! file text, so one declaration may legitimately yield more than one entity
//! (`function App() {` is both a function and a component). Each match is then
//! enriched with a context window, the comments directly above it and the
//! file's dependency records.

use std::sync::Arc;

use regex::Regex;

use crate::error::Result;
use super::analysis::{CodeEntity, Complexity, Dependency, DependencyKind, EntityKind};

/// Characters kept on each side of a match for the context window
pub const CONTEXT_RADIUS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Function,
    Class,
    Component,
}

#[derive(Debug)]
pub struct ExtractionPattern {
    pub kind: PatternKind,
    regex: Regex,
}

/// Compiled patterns shared read-only by every file in a run
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<ExtractionPattern>,
    import_regex: Regex,
    require_regex: Regex,
    declaration_regex: Regex,
}

impl PatternRegistry {
    pub fn new() -> Result<Self> {
        let patterns = vec![
            ExtractionPattern {
                kind: PatternKind::Function,
                regex: Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(([^)]*)\)")?,
            },
            ExtractionPattern {
                kind: PatternKind::Class,
                regex: Regex::new(
                    r"\bclass\s+([A-Za-z_$][\w$]*)(?:\s+extends\s+([A-Za-z_$][\w$.]*))?",
                )?,
            },
            ExtractionPattern {
                kind: PatternKind::Component,
                regex: Regex::new(
                    r"(?:\bexport\s+)?\b(?:const|function)\s+(\w+)\s*(?:\([^)]*\))?\s*(?:=\s*)?\{",
                )?,
            },
        ];

        Ok(Self {
            patterns,
            import_regex: Regex::new(r#"\bimport\s+[^;]*?\s*from\s+['"]([^'"]+)['"]"#)?,
            require_regex: Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#)?,
            declaration_regex: Regex::new(r"^(function|class|const|let|var)\s")?,
        })
    }

    pub fn patterns(&self) -> &[ExtractionPattern] {
        &self.patterns
    }
}

/// Entities and dependency records found in one file
#[derive(Debug, Clone)]
pub struct Extraction {
    pub entities: Vec<CodeEntity>,
    pub dependencies: Vec<Arc<Dependency>>,
}

pub struct EntityExtractor {
    registry: Arc<PatternRegistry>,
}

impl EntityExtractor {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    /// Run every registered pattern over `text`
    pub fn extract(&self, text: &str) -> Extraction {
        let dependencies = self.extract_dependencies(text);
        let mut entities = Vec::new();

        for pattern in self.registry.patterns() {
            for caps in pattern.regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let Some(name) = caps.get(1) else { continue };
                let offset = whole.start();

                let (kind, complexity) = match pattern.kind {
                    PatternKind::Function => {
                        let params = split_params(caps.get(2).map_or("", |m| m.as_str()));
                        let complexity = Complexity::from_param_count(params.len());
                        (EntityKind::Function { params }, complexity)
                    }
                    PatternKind::Class => (
                        EntityKind::Class {
                            extends: caps.get(2).map(|m| m.as_str().to_string()),
                            methods: Vec::new(),
                            properties: Vec::new(),
                        },
                        Complexity::Low,
                    ),
                    PatternKind::Component => (
                        EntityKind::Component {
                            props: Vec::new(),
                            state: Vec::new(),
                            methods: Vec::new(),
                        },
                        Complexity::Low,
                    ),
                };

                entities.push(CodeEntity {
                    name: name.as_str().to_string(),
                    kind,
                    complexity,
                    offset,
                    line: line_of(text, offset) + 1,
                    context: context_window(text, offset, CONTEXT_RADIUS),
                    comments: self.extract_comments(text, offset),
                    dependencies: fresh_records(&dependencies),
                });
            }
        }

        Extraction {
            entities,
            dependencies,
        }
    }

    /// Every `import ... from '<m>'` occurrence, then every `require('<m>')`
    pub fn extract_dependencies(&self, text: &str) -> Vec<Arc<Dependency>> {
        let imports = self
            .registry
            .import_regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| (DependencyKind::Import, m.as_str()));
        let requires = self
            .registry
            .require_regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| (DependencyKind::Require, m.as_str()));

        imports
            .chain(requires)
            .map(|(kind, module)| {
                Arc::new(Dependency {
                    kind,
                    module: module.to_string(),
                })
            })
            .collect()
    }

    /// Comments directly above the line containing `offset`, in source order.
    ///
    /// A `/** ... */` block ends the walk and is kept verbatim. Otherwise
    /// contiguous `//` and `/* */` lines are collected until a code line or a
    /// foreign declaration is reached.
    pub fn extract_comments(&self, text: &str, offset: usize) -> Vec<String> {
        let lines: Vec<&str> = text.split('\n').collect();
        let entity_line = line_of(text, offset);
        let mut collected = Vec::new();

        let mut i = entity_line + 1;
        while i > 0 {
            i -= 1;
            if i == entity_line {
                continue;
            }

            let trimmed = lines[i].trim();
            if self.registry.declaration_regex.is_match(trimmed) {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }

            if trimmed.ends_with("*/") {
                let Some(start) = block_start(&lines, i) else {
                    break;
                };
                let block = lines[start..=i].join("\n").trim().to_string();
                let is_doc_block = lines[start].trim_start().starts_with("/**");
                collected.push(block);
                if is_doc_block {
                    break;
                }
                i = start;
                continue;
            }

            if trimmed.starts_with("//") || trimmed.starts_with("/*") {
                collected.push(trimmed.to_string());
                continue;
            }

            break;
        }

        collected.reverse();
        collected
    }
}

/// Up to `radius` characters on each side of `offset`, clipped to the text
pub fn context_window(text: &str, offset: usize, radius: usize) -> String {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let start = text[..offset]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(offset, |(i, _)| i);
    let end = text[offset..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| offset + i);

    text[start..end].to_string()
}

/// Opening line of the block comment closed on line `end`, if every line
/// between is a continuation line
fn block_start(lines: &[&str], end: usize) -> Option<usize> {
    if lines[end].trim_start().starts_with("/*") {
        return Some(end);
    }
    if !lines[end].trim_start().starts_with('*') {
        return None;
    }

    for i in (0..end).rev() {
        let trimmed = lines[i].trim_start();
        if trimmed.starts_with("/*") {
            return Some(i);
        }
        if !trimmed.starts_with('*') {
            return None;
        }
    }
    None
}

/// Each entity owns its own copy of the file's dependency records
fn fresh_records(records: &[Arc<Dependency>]) -> Vec<Arc<Dependency>> {
    records
        .iter()
        .map(|record| Arc::new(Dependency::clone(record)))
        .collect()
}

fn split_params(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Zero-based line index of a byte offset
fn line_of(text: &str, offset: usize) -> usize {
    text[..offset.min(text.len())].matches('\n').count()
}
