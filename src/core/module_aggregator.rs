use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::analysis::{Dependency, FileAnalysis, Module};
use super::synthesizer::DescriptionSynthesizer;

/// Module name used for files outside any `src` directory
pub const ROOT_MODULE: &str = "root";

/// Groups analyzed files into logical modules based on directory structure
pub struct ModuleAggregator<'a> {
    synthesizer: &'a DescriptionSynthesizer,
}

impl<'a> ModuleAggregator<'a> {
    pub fn new(synthesizer: &'a DescriptionSynthesizer) -> Self {
        Self { synthesizer }
    }

    /// Group files by module name, keeping first-seen module order and file order
    pub fn group_by_module<'f>(&self, files: &'f [FileAnalysis]) -> Vec<(String, Vec<&'f FileAnalysis>)> {
        let mut groups: Vec<(String, Vec<&FileAnalysis>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for file in files {
            let name = determine_module_name(&file.path);
            match index.get(&name) {
                Some(&i) => groups[i].1.push(file),
                None => {
                    index.insert(name.clone(), groups.len());
                    groups.push((name, vec![file]));
                }
            }
        }

        groups
    }

    /// Build modules with rolled-up entities, dependencies and a description
    pub fn aggregate(&self, files: &[FileAnalysis]) -> Vec<Module> {
        self.group_by_module(files)
            .into_iter()
            .map(|(name, members)| {
                let entities: Vec<_> = members
                    .iter()
                    .flat_map(|file| file.entities.iter().cloned())
                    .collect();

                let mut seen: HashSet<*const Dependency> = HashSet::new();
                let mut dependencies = Vec::new();
                for dependency in entities.iter().flat_map(|e| e.dependencies.iter()) {
                    if seen.insert(Arc::as_ptr(dependency)) {
                        dependencies.push(Arc::clone(dependency));
                    }
                }

                let description =
                    self.synthesizer
                        .describe_module(&name, members.len(), &entities);

                Module {
                    name,
                    files: members.iter().map(|f| f.path.clone()).collect(),
                    entities,
                    dependencies,
                    description,
                }
            })
            .collect()
    }
}

/// The path segment right after a segment equal to `src`, else [`ROOT_MODULE`]
pub fn determine_module_name(path: &Path) -> String {
    let path_str = path.to_string_lossy().replace('\\', "/");
    let segments: Vec<&str> = path_str.split('/').collect();

    segments
        .iter()
        .position(|segment| *segment == "src")
        .and_then(|i| segments.get(i + 1))
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .unwrap_or_else(|| ROOT_MODULE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::{CodeEntity, Complexity, DependencyKind, EntityKind};
    use crate::core::extractor::{EntityExtractor, PatternRegistry};
    use std::path::PathBuf;

    fn file(path: &str, entity_names: &[&str], deps: &[&str]) -> FileAnalysis {
        let dependencies: Vec<Arc<Dependency>> = deps
            .iter()
            .map(|m| {
                Arc::new(Dependency {
                    kind: DependencyKind::Import,
                    module: m.to_string(),
                })
            })
            .collect();
        let entities = entity_names
            .iter()
            .map(|name| CodeEntity {
                name: name.to_string(),
                kind: EntityKind::Function { params: vec![] },
                complexity: Complexity::Low,
                offset: 0,
                line: 1,
                context: String::new(),
                comments: vec![],
                dependencies: dependencies
                    .iter()
                    .map(|d| Arc::new(Dependency::clone(d)))
                    .collect(),
            })
            .collect();

        FileAnalysis {
            path: PathBuf::from(path),
            relative_path: PathBuf::from(path),
            language: "TypeScript".to_string(),
            line_count: 1,
            content_hash: String::new(),
            entities,
            dependencies,
            complexity: 0,
            quality: 1.0,
        }
    }

    #[test]
    fn test_group_by_src_segment() {
        let files = vec![
            file("app/src/auth/login.ts", &[], &[]),
            file("app/src/auth/signup.ts", &[], &[]),
            file("app/other/x.ts", &[], &[]),
        ];
        let synthesizer = DescriptionSynthesizer::new();
        let groups = ModuleAggregator::new(&synthesizer).group_by_module(&files);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "auth");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].path, PathBuf::from("app/src/auth/login.ts"));
        assert_eq!(groups[1].0, "root");
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn test_module_name_takes_segment_after_src_literally() {
        assert_eq!(determine_module_name(Path::new("src/index.ts")), "index.ts");
        assert_eq!(determine_module_name(Path::new("/p/src/api/client.ts")), "api");
        assert_eq!(determine_module_name(Path::new("/p/source/api/client.ts")), "root");
        assert_eq!(determine_module_name(Path::new("/p/mysrc/api.ts")), "root");
    }

    #[test]
    fn test_rollup_keeps_every_entity_record() {
        // a.ts: two entities carrying two records each
        let files = vec![
            file("src/ui/a.ts", &["one", "two"], &["react", "react"]),
            file("src/ui/b.ts", &["three"], &["react"]),
            file("src/ui/c.ts", &[], &["lodash"]),
        ];
        let synthesizer = DescriptionSynthesizer::new();
        let modules = ModuleAggregator::new(&synthesizer).aggregate(&files);

        assert_eq!(modules.len(), 1);
        let ui = &modules[0];
        assert_eq!(ui.files.len(), 3);
        let names: Vec<_> = ui.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three"]);

        let deps: Vec<_> = ui.dependencies.iter().map(|d| d.module.as_str()).collect();
        assert_eq!(deps, vec!["react"; 5]);
        assert!(ui.description.contains("ui"));
        assert_eq!(ui.services().count(), 0);
    }

    #[test]
    fn test_rollup_dedups_by_record_identity() {
        let mut shared = file("src/core/x.ts", &["a", "b"], &[]);
        let record = Arc::new(Dependency {
            kind: DependencyKind::Require,
            module: "fs".to_string(),
        });
        for entity in &mut shared.entities {
            entity.dependencies = vec![Arc::clone(&record), Arc::clone(&record)];
        }

        let synthesizer = DescriptionSynthesizer::new();
        let modules = ModuleAggregator::new(&synthesizer).aggregate(&[shared]);
        assert_eq!(modules[0].dependencies.len(), 1);
    }

    #[test]
    fn test_extracted_file_rolls_up_entities_times_imports() {
        let registry = Arc::new(PatternRegistry::new().unwrap());
        let extraction = EntityExtractor::new(registry)
            .extract("import x from 'y';\nclass A {}\nclass B {}\n");

        let mut analysis = file("src/lib/a.ts", &[], &[]);
        analysis.entities = extraction.entities;
        analysis.dependencies = extraction.dependencies;

        let synthesizer = DescriptionSynthesizer::new();
        let modules = ModuleAggregator::new(&synthesizer).aggregate(&[analysis]);
        assert_eq!(modules[0].entities.len(), 2);
        assert_eq!(modules[0].dependencies.len(), 2);
    }
}
