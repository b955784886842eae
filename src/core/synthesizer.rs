use serde::Serialize;

use super::analysis::{ArchitecturalPattern, CodeEntity, EntityKind};

const FUNCTION_TEMPLATE: &str = "The {name} function {action}. Parameters: {params}.";
const CLASS_TEMPLATE: &str = "The {name} class {purpose}, building on {parent}.";
const COMPONENT_TEMPLATE: &str = "The {name} component renders {elements} and manages {state}.";
const SERVICE_TEMPLATE: &str = "The {name} service {purpose}.";
const MODULE_TEMPLATE: &str = "The {name} module contains {files} and {entities}. It {purpose}.";
const ARCHITECTURE_TEMPLATE: &str =
    "{project} is organized into {modules} across {files}. Detected patterns: {patterns}. The system {purpose}.";

const DEFAULT_ACTION: &str = "performs operations";
const DEFAULT_PARAMS: &str = "none";
const DEFAULT_CLASS_PURPOSE: &str = "encapsulates related state and behavior";
const DEFAULT_PARENT: &str = "base functionality";
const DEFAULT_ELEMENTS: &str = "UI elements";
const DEFAULT_STATE: &str = "no local state";
const DEFAULT_PATTERNS: &str = "none";

/// Synthesized prose for one document
#[derive(Debug, Clone, Default, Serialize)]
pub struct Descriptions {
    pub overview: String,
    pub entities: Vec<EntityDescription>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityDescription {
    pub name: String,
    pub text: String,
}

/// Fills fixed sentence templates from counts and keyword heuristics
#[derive(Debug, Default)]
pub struct DescriptionSynthesizer;

impl DescriptionSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Overview plus one sentence per entity
    pub fn describe_entities(&self, entities: &[CodeEntity]) -> Descriptions {
        Descriptions {
            overview: self.generate_overview(entities),
            entities: entities
                .iter()
                .map(|entity| EntityDescription {
                    name: entity.name.clone(),
                    text: self.describe_entity(entity),
                })
                .collect(),
        }
    }

    pub fn describe_entity(&self, entity: &CodeEntity) -> String {
        match &entity.kind {
            EntityKind::Function { params } => {
                let action = summarize_comments(&entity.comments);
                let params = (!params.is_empty()).then(|| params.join(", "));
                fill(
                    FUNCTION_TEMPLATE,
                    &[
                        ("name", Some(entity.name.clone())),
                        ("action", action),
                        ("params", params),
                    ],
                    &[("action", DEFAULT_ACTION), ("params", DEFAULT_PARAMS)],
                )
            }
            EntityKind::Class { extends, .. } => fill(
                CLASS_TEMPLATE,
                &[
                    ("name", Some(entity.name.clone())),
                    ("purpose", summarize_comments(&entity.comments)),
                    ("parent", extends.clone()),
                ],
                &[("purpose", DEFAULT_CLASS_PURPOSE), ("parent", DEFAULT_PARENT)],
            ),
            EntityKind::Component { props, state, .. } => fill(
                COMPONENT_TEMPLATE,
                &[
                    ("name", Some(entity.name.clone())),
                    ("elements", (!props.is_empty()).then(|| props.join(", "))),
                    ("state", (!state.is_empty()).then(|| state.join(", "))),
                ],
                &[("elements", DEFAULT_ELEMENTS), ("state", DEFAULT_STATE)],
            ),
            EntityKind::Service => fill(
                SERVICE_TEMPLATE,
                &[
                    ("name", Some(entity.name.clone())),
                    ("purpose", Some(self.infer_purpose(std::slice::from_ref(entity)).to_string())),
                ],
                &[],
            ),
        }
    }

    /// First matching rule wins: components, services, auth names, api names
    pub fn infer_purpose(&self, entities: &[CodeEntity]) -> &'static str {
        if entities.iter().any(|e| e.kind.is_component()) {
            "renders user interface components"
        } else if entities.iter().any(|e| e.kind.is_service()) {
            "provides business logic and data processing"
        } else if entities.iter().any(|e| e.name.to_lowercase().contains("auth")) {
            "handles authentication and authorization"
        } else if entities.iter().any(|e| e.name.to_lowercase().contains("api")) {
            "manages API communications"
        } else {
            "provides core functionality"
        }
    }

    /// Kind tally in first-seen order followed by the inferred purpose
    pub fn generate_overview(&self, entities: &[CodeEntity]) -> String {
        let mut tally: Vec<(&EntityKind, usize)> = Vec::new();
        for entity in entities {
            match tally
                .iter_mut()
                .find(|(kind, _)| kind.label() == entity.kind.label())
            {
                Some((_, count)) => *count += 1,
                None => tally.push((&entity.kind, 1)),
            }
        }

        let contents = if tally.is_empty() {
            "no recognized entities".to_string()
        } else {
            tally
                .iter()
                .map(|(kind, count)| count_noun(*count, kind.label()))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "This file contains {}. It provides functionality for {}.",
            contents,
            self.infer_purpose(entities)
        )
    }

    pub fn describe_module(&self, name: &str, file_count: usize, entities: &[CodeEntity]) -> String {
        fill(
            MODULE_TEMPLATE,
            &[
                ("name", Some(name.to_string())),
                ("files", Some(count_noun(file_count, "file"))),
                ("entities", Some(count_noun(entities.len(), "entity"))),
                ("purpose", Some(self.infer_purpose(entities).to_string())),
            ],
            &[],
        )
    }

    pub fn describe_architecture(
        &self,
        project: &str,
        module_count: usize,
        file_count: usize,
        patterns: &[ArchitecturalPattern],
        entities: &[CodeEntity],
    ) -> String {
        let patterns = (!patterns.is_empty()).then(|| {
            patterns
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        });

        fill(
            ARCHITECTURE_TEMPLATE,
            &[
                ("project", Some(project.to_string())),
                ("modules", Some(count_noun(module_count, "module"))),
                ("files", Some(count_noun(file_count, "file"))),
                ("patterns", patterns),
                ("purpose", Some(self.infer_purpose(entities).to_string())),
            ],
            &[("patterns", DEFAULT_PATTERNS)],
        )
    }
}

/// Replace the first `{key}` of each placeholder, falling back to its default
fn fill(template: &str, values: &[(&str, Option<String>)], defaults: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        let replacement = match value {
            Some(v) => v.clone(),
            None => defaults
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, d)| d.to_string())
                .unwrap_or_default(),
        };
        out = out.replacen(&format!("{{{}}}", key), &replacement, 1);
    }
    out
}

fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}", count, pluralize(noun))
    }
}

fn pluralize(noun: &str) -> String {
    if noun.ends_with("ss") {
        format!("{}es", noun)
    } else if let Some(stem) = noun.strip_suffix('y') {
        format!("{}ies", stem)
    } else {
        format!("{}s", noun)
    }
}

/// First sentence of the first comment, stripped of comment markers
fn summarize_comments(comments: &[String]) -> Option<String> {
    let text = comments
        .iter()
        .flat_map(|comment| comment.lines())
        .map(|line| {
            line.trim()
                .trim_start_matches("/**")
                .trim_start_matches("/*")
                .trim_start_matches("//")
                .trim_end_matches("*/")
                .trim_start_matches('*')
                .trim()
        })
        .filter(|line| !line.is_empty() && !line.starts_with('@'))
        .collect::<Vec<_>>()
        .join(" ");

    let sentence = text.split(". ").next().unwrap_or("").trim_end_matches('.').trim();
    if sentence.is_empty() {
        return None;
    }

    let mut chars = sentence.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::Complexity;

    fn entity(name: &str, kind: EntityKind, comments: &[&str]) -> CodeEntity {
        CodeEntity {
            name: name.to_string(),
            kind,
            complexity: Complexity::Low,
            offset: 0,
            line: 1,
            context: String::new(),
            comments: comments.iter().map(|c| c.to_string()).collect(),
            dependencies: vec![],
        }
    }

    fn function(name: &str) -> CodeEntity {
        entity(name, EntityKind::Function { params: vec![] }, &[])
    }

    fn component(name: &str) -> CodeEntity {
        entity(
            name,
            EntityKind::Component {
                props: vec![],
                state: vec![],
                methods: vec![],
            },
            &[],
        )
    }

    #[test]
    fn test_infer_purpose_first_match_wins() {
        let s = DescriptionSynthesizer::new();
        assert_eq!(
            s.infer_purpose(&[function("authApi"), component("Login")]),
            "renders user interface components"
        );
        assert_eq!(
            s.infer_purpose(&[entity("Billing", EntityKind::Service, &[]), function("authorize")]),
            "provides business logic and data processing"
        );
        assert_eq!(
            s.infer_purpose(&[function("fetchApi"), function("checkAuth")]),
            "handles authentication and authorization"
        );
        assert_eq!(s.infer_purpose(&[function("callAPI")]), "manages API communications");
        assert_eq!(s.infer_purpose(&[]), "provides core functionality");
    }

    #[test]
    fn test_overview_tallies_and_pluralizes() {
        let s = DescriptionSynthesizer::new();
        let class = entity(
            "Store",
            EntityKind::Class {
                extends: None,
                methods: vec![],
                properties: vec![],
            },
            &[],
        );
        let overview = s.generate_overview(&[function("a"), class, function("b")]);
        assert_eq!(
            overview,
            "This file contains 2 functions, 1 class. It provides functionality for provides core functionality."
        );
    }

    #[test]
    fn test_function_sentence_uses_comment_or_default() {
        let s = DescriptionSynthesizer::new();
        let documented = entity(
            "add",
            EntityKind::Function {
                params: vec!["a".to_string(), "b".to_string()],
            },
            &["/** Adds two numbers. Returns the sum. */"],
        );
        assert_eq!(
            s.describe_entity(&documented),
            "The add function adds two numbers. Parameters: a, b."
        );
        assert_eq!(
            s.describe_entity(&function("noop")),
            "The noop function performs operations. Parameters: none."
        );
    }

    #[test]
    fn test_component_and_class_defaults() {
        let s = DescriptionSynthesizer::new();
        assert_eq!(
            s.describe_entity(&component("Card")),
            "The Card component renders UI elements and manages no local state."
        );
        let child = entity(
            "Dog",
            EntityKind::Class {
                extends: Some("Animal".to_string()),
                methods: vec![],
                properties: vec![],
            },
            &[],
        );
        assert_eq!(
            s.describe_entity(&child),
            "The Dog class encapsulates related state and behavior, building on Animal."
        );
    }

    #[test]
    fn test_module_and_architecture_sentences() {
        let s = DescriptionSynthesizer::new();
        assert_eq!(
            s.describe_module("auth", 2, &[function("login")]),
            "The auth module contains 2 files and 1 entity. It handles authentication and authorization."
        );
        assert_eq!(
            s.describe_architecture("shop", 1, 1, &[], &[]),
            "shop is organized into 1 module across 1 file. Detected patterns: none. The system provides core functionality."
        );
        assert!(s
            .describe_architecture(
                "shop",
                3,
                9,
                &[ArchitecturalPattern::Mvc, ArchitecturalPattern::Repository],
                &[]
            )
            .contains("Detected patterns: MVC, Repository."));
    }

    #[test]
    fn test_fill_replaces_first_occurrence_only() {
        let out = fill("{x} and {x}", &[("x", Some("one".to_string()))], &[]);
        assert_eq!(out, "one and {x}");
    }
}
