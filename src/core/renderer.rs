use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::{debug, warn};

use crate::error::Result;
use super::analysis::{ArchitectureSnapshot, CodeEntity, FileAnalysis, Module};
use super::architecture::render_dependency_graph;
use super::synthesizer::Descriptions;
use super::templates::{TemplateKind, TemplateSet};

/// Output folder for file and module documents
pub const DEVELOPMENT_DIR: &str = "02_Development_Phase";

/// Output folder for the architecture document
pub const REFERENCES_DIR: &str = "05_References";

const ENTITIES_PARTIAL: &str = r#"{% for entity in entities %}### {{ entity.name }}

**Type:** {{ entity.kind }}
{% if entity.params | length > 0 %}
**Parameters:**

{% for param in entity.params %}- `{{ param }}`
{% endfor %}{% endif %}{% if entity.description %}
**Description:** {{ entity.description }}
{% endif %}
{% endfor %}"#;

const LIST_PARTIAL: &str =
    r#"{% if items | length == 0 %}None{% else %}{% for item in items %}- {{ item }}
{% endfor %}{% endif %}"#;

const DEPENDENCY_TABLE_PARTIAL: &str = r#"{% if deps | length == 0 %}None{% else %}| Dependency | Usage |
|---|---|
{% for dep in deps %}| `{{ dep.module }}` | {{ dep.count }} |
{% endfor %}{% endif %}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    File,
    Module,
    Architecture,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub entity_count: usize,
    pub quality: f64,
    pub confidence: f64,
}

/// A finished document and where it belongs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    #[serde(rename = "type")]
    pub kind: DocumentKind,

    /// Relative source path, module name, or `architecture`
    pub name: String,

    pub content: String,

    pub target_path: PathBuf,

    pub metadata: DocumentMetadata,
}

/// Values merged into a template
#[derive(Debug, Default)]
pub struct TemplateData<'a> {
    /// Scalar placeholders, substituted in insertion order
    pub fields: Vec<(String, String)>,
    pub entities: Option<&'a [CodeEntity]>,
    pub descriptions: Option<&'a Descriptions>,
}

impl<'a> TemplateData<'a> {
    pub fn field(mut self, key: &str, value: impl ToString) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }
}

#[derive(Serialize)]
struct EntityView<'a> {
    name: &'a str,
    kind: String,
    params: &'a [String],
    description: String,
}

#[derive(Serialize)]
struct UsageView<'a> {
    module: &'a str,
    count: usize,
}

/// Merges templates with analysis data and scores the result
pub struct DocumentRenderer<'a> {
    templates: &'a TemplateSet,
    tera: Tera,
    output_dir: PathBuf,
    generated_at: String,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(templates: &'a TemplateSet, output_dir: &Path, generated_at: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template("entities.md", ENTITIES_PARTIAL)?;
        tera.add_raw_template("list.md", LIST_PARTIAL)?;
        tera.add_raw_template("dependency_table.md", DEPENDENCY_TABLE_PARTIAL)?;

        Ok(Self {
            templates,
            tera,
            output_dir: output_dir.to_path_buf(),
            generated_at: generated_at.to_string(),
        })
    }

    /// Document for one analyzed file; `None` when its template is missing
    pub fn render_file(
        &self,
        analysis: &FileAnalysis,
        descriptions: &Descriptions,
    ) -> Result<Option<RenderedDocument>> {
        let kind = select_file_template(analysis);
        let Some(template) = self.template_for(kind, &analysis.relative_path.display().to_string())
        else {
            return Ok(None);
        };

        let relative = analysis.relative_path.to_string_lossy().replace('\\', "/");
        let title = analysis
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| relative.clone());
        let summaries: Vec<&str> = descriptions.entities.iter().map(|d| d.text.as_str()).collect();

        let data = TemplateData {
            entities: Some(&analysis.entities),
            descriptions: Some(descriptions),
            ..TemplateData::default()
        }
        .field("title", &title)
        .field("path", &relative)
        .field("language", &analysis.language)
        .field("lines", analysis.line_count)
        .field("complexity", analysis.complexity)
        .field("quality", format!("{:.2}", analysis.quality))
        .field("content_hash", &analysis.content_hash)
        .field("generated_at", &self.generated_at)
        .field("entity_summaries", self.render_list(&summaries)?);

        let content = self.render_template(template, &data)?;
        let target_path = self
            .output_dir
            .join(DEVELOPMENT_DIR)
            .join(analysis.relative_path.with_extension("md"));

        Ok(Some(self.finish(
            DocumentKind::File,
            relative,
            content,
            target_path,
            &analysis.entities,
            descriptions,
        )))
    }

    pub fn render_module(
        &self,
        module: &Module,
        descriptions: &Descriptions,
    ) -> Result<Option<RenderedDocument>> {
        let Some(template) = self.template_for(TemplateKind::Module, &module.name) else {
            return Ok(None);
        };

        let files: Vec<String> = module
            .files
            .iter()
            .map(|f| f.to_string_lossy().replace('\\', "/"))
            .collect();
        let components: Vec<String> = module
            .components()
            .map(|e| format!("**{}** (line {})", e.name, e.line))
            .collect();
        let services: Vec<String> = module.services().map(|e| format!("**{}**", e.name)).collect();
        let dependencies: Vec<String> = module
            .dependencies
            .iter()
            .map(|d| format!("`{}`", d.module))
            .collect();

        let data = TemplateData {
            entities: Some(&module.entities),
            descriptions: Some(descriptions),
            ..TemplateData::default()
        }
        .field("name", &module.name)
        .field("file_count", module.files.len())
        .field("entity_count", module.entities.len())
        .field("generated_at", &self.generated_at)
        .field("files", files.join("\n"))
        .field("components", self.render_list(&components)?)
        .field("services", self.render_list(&services)?)
        .field("dependencies", self.render_list(&dependencies)?);

        let content = self.render_template(template, &data)?;
        let target_path = self
            .output_dir
            .join(DEVELOPMENT_DIR)
            .join(format!("{}.md", module.name));

        Ok(Some(self.finish(
            DocumentKind::Module,
            module.name.clone(),
            content,
            target_path,
            &module.entities,
            descriptions,
        )))
    }

    pub fn render_architecture(
        &self,
        project: &str,
        snapshot: &ArchitectureSnapshot,
        modules: &[Module],
        entities: &[CodeEntity],
        descriptions: &Descriptions,
    ) -> Result<Option<RenderedDocument>> {
        let Some(template) = self.template_for(TemplateKind::Architecture, "architecture") else {
            return Ok(None);
        };

        let module_lines: Vec<String> = modules
            .iter()
            .map(|m| format!("**{}**: {}", m.name, m.description))
            .collect();
        let pattern_lines: Vec<String> = snapshot
            .patterns
            .iter()
            .map(|p| format!("**{}**: {}", p.name(), p.description()))
            .collect();
        let usage: Vec<UsageView> = snapshot
            .ranking
            .iter()
            .map(|u| UsageView {
                module: &u.module,
                count: u.count(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("deps", &usage);
        let dependency_table = self.tera.render("dependency_table.md", &context)?;

        let data = TemplateData {
            entities: Some(entities),
            descriptions: Some(descriptions),
            ..TemplateData::default()
        }
        .field("project", project)
        .field("module_count", snapshot.modules.len())
        .field("file_count", snapshot.total_files)
        .field("entity_count", snapshot.total_entities)
        .field("generated_at", &self.generated_at)
        .field("modules", self.render_list(&module_lines)?)
        .field("patterns", self.render_list(&pattern_lines)?)
        .field("dependency_table", dependency_table)
        .field("dependency_graph", render_dependency_graph(&snapshot.diagram).trim_end());

        let content = self.render_template(template, &data)?;
        let target_path = self.output_dir.join(REFERENCES_DIR).join("architecture.md");

        Ok(Some(self.finish(
            DocumentKind::Architecture,
            "architecture".to_string(),
            content,
            target_path,
            entities,
            descriptions,
        )))
    }

    /// Scalars everywhere, then the first `{{entities}}`, then the first `{{description}}`
    pub fn render_template(&self, template: &str, data: &TemplateData<'_>) -> Result<String> {
        let mut result = template.to_string();

        for (key, value) in &data.fields {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }

        if let Some(entities) = data.entities {
            let block = self.render_entities(entities)?;
            result = result.replacen("{{entities}}", &block, 1);
        }

        if let Some(descriptions) = data.descriptions {
            result = result.replacen("{{description}}", &descriptions.overview, 1);
        }

        Ok(result)
    }

    fn render_entities(&self, entities: &[CodeEntity]) -> Result<String> {
        if entities.is_empty() {
            return Ok("None".to_string());
        }

        let views: Vec<EntityView> = entities
            .iter()
            .map(|e| EntityView {
                name: &e.name,
                kind: e.kind.to_string(),
                params: e.kind.params(),
                description: e.comments.join(" "),
            })
            .collect();

        let mut context = Context::new();
        context.insert("entities", &views);
        Ok(self.tera.render("entities.md", &context)?.trim_end().to_string())
    }

    fn render_list<S: Serialize>(&self, items: &[S]) -> Result<String> {
        let mut context = Context::new();
        context.insert("items", items);
        Ok(self.tera.render("list.md", &context)?.trim_end().to_string())
    }

    fn template_for(&self, kind: TemplateKind, subject: &str) -> Option<&'a str> {
        let template = self.templates.get(kind);
        if template.is_none() {
            warn!("⚠️ Skipping {}: no '{}' template available", subject, kind);
        }
        template
    }

    fn finish(
        &self,
        kind: DocumentKind,
        name: String,
        content: String,
        target_path: PathBuf,
        entities: &[CodeEntity],
        descriptions: &Descriptions,
    ) -> RenderedDocument {
        let metadata = DocumentMetadata {
            entity_count: entities.len(),
            quality: assess_quality(&content),
            confidence: calculate_confidence(entities, descriptions),
        };
        debug!(
            "Rendered {} (quality {:.2}, confidence {:.2})",
            target_path.display(),
            metadata.quality,
            metadata.confidence
        );

        RenderedDocument {
            kind,
            name,
            content,
            target_path,
            metadata,
        }
    }
}

/// Component files get the component template, service paths the service one, the rest api
pub fn select_file_template(analysis: &FileAnalysis) -> TemplateKind {
    if analysis.entities.iter().any(|e| e.kind.is_component()) {
        TemplateKind::Component
    } else if analysis.path_str().contains("service") {
        TemplateKind::Service
    } else {
        TemplateKind::Api
    }
}

/// Structural completeness: H1, H2, fenced code, and length over 500 chars
pub fn assess_quality(text: &str) -> f64 {
    let mut score: f64 = 0.0;
    if text.lines().any(|line| line.starts_with("# ")) {
        score += 0.3;
    }
    if text.lines().any(|line| line.starts_with("## ")) {
        score += 0.3;
    }
    if text.contains("```") {
        score += 0.2;
    }
    if text.chars().count() > 500 {
        score += 0.2;
    }
    score.min(1.0)
}

/// Evidence behind the prose: entities, an overview, and documented entities
pub fn calculate_confidence(entities: &[CodeEntity], descriptions: &Descriptions) -> f64 {
    let mut score: f64 = 0.0;
    if !entities.is_empty() {
        score += 0.4;
    }
    if !descriptions.overview.is_empty() {
        score += 0.4;
    }
    if entities.iter().any(|e| !e.comments.is_empty()) {
        score += 0.2;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::{Complexity, EntityKind};

    fn entity(name: &str, kind: EntityKind, comments: &[&str]) -> CodeEntity {
        CodeEntity {
            name: name.to_string(),
            kind,
            complexity: Complexity::Low,
            offset: 0,
            line: 3,
            context: String::new(),
            comments: comments.iter().map(|c| c.to_string()).collect(),
            dependencies: vec![],
        }
    }

    fn analysis(path: &str, entities: Vec<CodeEntity>) -> FileAnalysis {
        FileAnalysis {
            path: PathBuf::from("/project").join(path),
            relative_path: PathBuf::from(path),
            language: "TypeScript".to_string(),
            line_count: 12,
            content_hash: "abc123".to_string(),
            entities,
            dependencies: vec![],
            complexity: 2,
            quality: 0.9,
        }
    }

    fn overview(text: &str) -> Descriptions {
        Descriptions {
            overview: text.to_string(),
            entities: vec![],
        }
    }

    #[test]
    fn test_render_template_substitution_rules() {
        let templates = TemplateSet::default();
        let renderer = DocumentRenderer::new(&templates, Path::new("out"), "t0").unwrap();
        let entities = vec![entity(
            "add",
            EntityKind::Function {
                params: vec!["a".to_string(), "b".to_string()],
            },
            &["/** Adds */"],
        )];
        let descriptions = overview("Overview text");
        let data = TemplateData {
            entities: Some(&entities),
            descriptions: Some(&descriptions),
            ..TemplateData::default()
        }
        .field("name", "calc");

        let out = renderer
            .render_template(
                "{{name}}/{{name}}\n{{entities}}\n{{entities}}\n{{description}} {{description}}",
                &data,
            )
            .unwrap();

        assert!(out.starts_with("calc/calc\n### add"));
        assert!(out.contains("**Type:** Function"));
        assert!(out.contains("- `a`\n- `b`"));
        assert!(out.contains("**Description:** /** Adds */"));
        assert!(out.contains("\n{{entities}}\n"));
        assert!(out.ends_with("Overview text {{description}}"));
    }

    #[test]
    fn test_entity_block_omits_empty_sections() {
        let templates = TemplateSet::default();
        let renderer = DocumentRenderer::new(&templates, Path::new("out"), "t0").unwrap();
        let entities = vec![entity(
            "Shape",
            EntityKind::Class {
                extends: None,
                methods: vec![],
                properties: vec![],
            },
            &[],
        )];
        let data = TemplateData {
            entities: Some(&entities),
            ..TemplateData::default()
        };

        let out = renderer.render_template("{{entities}}", &data).unwrap();
        assert!(out.contains("### Shape"));
        assert!(out.contains("**Type:** Class"));
        assert!(!out.contains("**Parameters:**"));
        assert!(!out.contains("**Description:**"));
    }

    #[test]
    fn test_file_routing_and_template_selection() {
        let templates = TemplateSet::builtin();
        let renderer = DocumentRenderer::new(&templates, Path::new("out"), "t0").unwrap();

        let plain = analysis("src/utils/math.ts", vec![]);
        assert_eq!(select_file_template(&plain), TemplateKind::Api);
        let doc = renderer
            .render_file(&plain, &overview("x"))
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.target_path,
            PathBuf::from("out/02_Development_Phase/src/utils/math.md")
        );
        assert_eq!(doc.name, "src/utils/math.ts");
        assert!(doc.content.starts_with("# math"));

        let service = analysis("src/services/billing.ts", vec![]);
        assert_eq!(select_file_template(&service), TemplateKind::Service);

        let ui = analysis(
            "src/services/Widget.tsx",
            vec![entity(
                "Widget",
                EntityKind::Component {
                    props: vec![],
                    state: vec![],
                    methods: vec![],
                },
                &[],
            )],
        );
        assert_eq!(select_file_template(&ui), TemplateKind::Component);
    }

    #[test]
    fn test_missing_template_is_skipped() {
        let mut templates = TemplateSet::builtin();
        templates.remove(TemplateKind::Api);
        templates.remove(TemplateKind::Module);
        let renderer = DocumentRenderer::new(&templates, Path::new("out"), "t0").unwrap();

        let result = renderer.render_file(&analysis("lib/x.js", vec![]), &overview("x"));
        assert!(result.unwrap().is_none());

        let module = Module {
            name: "auth".to_string(),
            files: vec![],
            entities: vec![],
            dependencies: vec![],
            description: String::new(),
        };
        assert!(renderer
            .render_module(&module, &overview(""))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_module_document_sections() {
        let templates = TemplateSet::builtin();
        let renderer = DocumentRenderer::new(&templates, Path::new("out"), "t0").unwrap();
        let module = Module {
            name: "auth".to_string(),
            files: vec![PathBuf::from("src/auth/login.ts")],
            entities: vec![entity(
                "LoginForm",
                EntityKind::Component {
                    props: vec![],
                    state: vec![],
                    methods: vec![],
                },
                &[],
            )],
            dependencies: vec![],
            description: "The auth module.".to_string(),
        };

        let doc = renderer
            .render_module(&module, &overview(&module.description))
            .unwrap()
            .unwrap();
        assert_eq!(doc.target_path, PathBuf::from("out/02_Development_Phase/auth.md"));
        assert!(doc.content.contains("## Components\n\n- **LoginForm** (line 3)"));
        assert!(doc.content.contains("## Services\n\nNone"));
        assert!(doc.content.contains("## Dependencies\n\nNone"));
        assert!(doc.content.contains("The auth module."));
        assert_eq!(doc.metadata.entity_count, 1);
    }

    #[test]
    fn test_quality_weights() {
        assert_eq!(assess_quality(""), 0.0);
        assert!((assess_quality("# Title\n") - 0.3).abs() < 1e-9);
        assert!((assess_quality("# T\n## S\n```\ncode\n```\n") - 0.8).abs() < 1e-9);
        let long = format!("# T\n## S\n```\n```\n{}", "x".repeat(600));
        assert_eq!(assess_quality(&long), 1.0);
        assert_eq!(assess_quality("### only h3"), 0.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let inputs = ["", "# a", "## b", "```", &"y".repeat(1000)];
        for input in inputs {
            let q = assess_quality(input);
            assert!((0.0..=1.0).contains(&q));
        }

        let documented = vec![entity("f", EntityKind::Function { params: vec![] }, &["// doc"])];
        let c = calculate_confidence(&documented, &overview("o"));
        assert!((0.0..=1.0).contains(&c));
        assert!((c - 1.0).abs() < 1e-9);
        assert_eq!(calculate_confidence(&[], &overview("")), 0.0);
        assert!((calculate_confidence(&[], &overview("o")) - 0.4).abs() < 1e-9);
    }
}
