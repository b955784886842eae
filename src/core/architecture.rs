use std::collections::HashMap;

use super::analysis::{ArchitecturalPattern, ArchitectureSnapshot, DependencyUsage, FileAnalysis, Module};

/// Number of dependencies kept in the usage ranking
pub const RANKING_LIMIT: usize = 10;

/// Number of insertion-order dependencies drawn in the graph
pub const DIAGRAM_LIMIT: usize = 5;

/// Dependency usage keyed by module name, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct DependencyUsageMap {
    entries: Vec<DependencyUsage>,
}

impl DependencyUsageMap {
    pub fn entries(&self) -> &[DependencyUsage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest usage counts first; ties keep first-seen order
    pub fn ranking(&self, limit: usize) -> Vec<DependencyUsage> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count().cmp(&a.count()));
        ranked.truncate(limit);
        ranked
    }

    /// Leading entries in first-seen order, independent of the ranking
    pub fn diagram(&self, limit: usize) -> Vec<DependencyUsage> {
        self.entries.iter().take(limit).cloned().collect()
    }
}

/// Whole-project dependency and structure analysis
#[derive(Debug, Default)]
pub struct ArchitectureAnalyzer;

impl ArchitectureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, files: &[FileAnalysis], modules: &[Module]) -> ArchitectureSnapshot {
        let usage = self.analyze_dependencies(files);

        ArchitectureSnapshot {
            modules: modules.iter().map(|m| m.name.clone()).collect(),
            ranking: usage.ranking(RANKING_LIMIT),
            diagram: usage.diagram(DIAGRAM_LIMIT),
            patterns: self.identify_patterns(files),
            total_files: files.len(),
            total_entities: files.iter().map(|f| f.entities.len()).sum(),
        }
    }

    /// Every dependency occurrence of every file, so repeated imports count repeatedly
    pub fn analyze_dependencies(&self, files: &[FileAnalysis]) -> DependencyUsageMap {
        let mut entries: Vec<DependencyUsage> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for file in files {
            for dependency in &file.dependencies {
                match index.get(&dependency.module) {
                    Some(&i) => entries[i].consumers.push(file.relative_path.clone()),
                    None => {
                        index.insert(dependency.module.clone(), entries.len());
                        entries.push(DependencyUsage {
                            module: dependency.module.clone(),
                            consumers: vec![file.relative_path.clone()],
                        });
                    }
                }
            }
        }

        DependencyUsageMap { entries }
    }

    pub fn identify_patterns(&self, files: &[FileAnalysis]) -> Vec<ArchitecturalPattern> {
        let paths: Vec<String> = files.iter().map(FileAnalysis::path_str).collect();
        detect_patterns(paths.iter().map(String::as_str))
    }
}

/// Path-substring pattern checks, evaluated independently in a fixed order
pub fn detect_patterns<'a, I>(paths: I) -> Vec<ArchitecturalPattern>
where
    I: IntoIterator<Item = &'a str>,
{
    let paths: Vec<&str> = paths.into_iter().collect();
    let any = |needles: &[&str]| paths.iter().any(|p| needles.iter().any(|n| p.contains(n)));

    let mut patterns = Vec::new();
    if any(&["controller"]) && any(&["model"]) && any(&["view", "component"]) {
        patterns.push(ArchitecturalPattern::Mvc);
    }
    if any(&["service"]) {
        patterns.push(ArchitecturalPattern::ServiceLayer);
    }
    if any(&["repository", "repo"]) {
        patterns.push(ArchitecturalPattern::Repository);
    }
    patterns
}

/// Replace every non-alphanumeric character with `_`
pub fn sanitize_node_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Mermaid flowchart of the given dependencies and their consumers
pub fn render_dependency_graph(usages: &[DependencyUsage]) -> String {
    let mut graph = String::from("graph TD\n");

    if usages.is_empty() {
        graph.push_str("    none[\"No dependencies detected\"]\n");
        return graph;
    }

    for usage in usages {
        let dep_id = format!("dep_{}", sanitize_node_id(&usage.module));
        graph.push_str(&format!("    {}[\"{}\"]\n", dep_id, usage.module));
        for consumer in &usage.consumers {
            let consumer = consumer.to_string_lossy().replace('\\', "/");
            graph.push_str(&format!(
                "    file_{}[\"{}\"] --> {}\n",
                sanitize_node_id(&consumer),
                consumer,
                dep_id
            ));
        }
    }

    graph
}
