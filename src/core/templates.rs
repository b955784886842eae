use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::TemplateConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Component,
    Service,
    Api,
    Module,
    Architecture,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::Component,
        TemplateKind::Service,
        TemplateKind::Api,
        TemplateKind::Module,
        TemplateKind::Architecture,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TemplateKind::Component => "component",
            TemplateKind::Service => "service",
            TemplateKind::Api => "api",
            TemplateKind::Module => "module",
            TemplateKind::Architecture => "architecture",
        }
    }

    pub fn builtin(&self) -> &'static str {
        match self {
            TemplateKind::Component => COMPONENT_TEMPLATE,
            TemplateKind::Service => SERVICE_TEMPLATE,
            TemplateKind::Api => API_TEMPLATE,
            TemplateKind::Module => MODULE_TEMPLATE,
            TemplateKind::Architecture => ARCHITECTURE_TEMPLATE,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Markdown templates loaded once per run
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<TemplateKind, String>,
}

impl TemplateSet {
    /// Resolve every kind: explicit path, then `<template_dir>/<kind>.md`, then the bundled copy
    pub fn load(config: &TemplateConfig) -> Self {
        let mut templates = HashMap::new();

        for kind in TemplateKind::ALL {
            if let Some(path) = config.paths.get(kind.key()) {
                let path = resolve_relative(path, config.template_dir.as_deref());
                match std::fs::read_to_string(&path) {
                    Ok(content) => {
                        debug!("Loaded {} template from {}", kind, path.display());
                        templates.insert(kind, content);
                    }
                    Err(e) => {
                        warn!("⚠️ Template '{}' at {} could not be read: {}", kind, path.display(), e);
                    }
                }
                continue;
            }

            if let Some(dir) = &config.template_dir {
                let candidate = dir.join(format!("{}.md", kind.key()));
                if let Ok(content) = std::fs::read_to_string(&candidate) {
                    debug!("Loaded {} template from {}", kind, candidate.display());
                    templates.insert(kind, content);
                    continue;
                }
            }

            if config.builtin_fallback {
                templates.insert(kind, kind.builtin().to_string());
            } else {
                warn!("⚠️ No template configured for '{}'", kind);
            }
        }

        Self { templates }
    }

    /// All bundled templates
    pub fn builtin() -> Self {
        Self {
            templates: TemplateKind::ALL
                .iter()
                .map(|kind| (*kind, kind.builtin().to_string()))
                .collect(),
        }
    }

    pub fn get(&self, kind: TemplateKind) -> Option<&str> {
        self.templates.get(&kind).map(String::as_str)
    }

    pub fn insert(&mut self, kind: TemplateKind, content: impl Into<String>) {
        self.templates.insert(kind, content.into());
    }

    pub fn remove(&mut self, kind: TemplateKind) {
        self.templates.remove(&kind);
    }
}

/// Write the bundled templates into `dir`, returning the written paths
pub fn write_builtin_templates(dir: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for kind in TemplateKind::ALL {
        let path = dir.join(format!("{}.md", kind.key()));
        if path.exists() && !overwrite {
            continue;
        }
        std::fs::write(&path, kind.builtin())?;
        written.push(path);
    }
    Ok(written)
}

fn resolve_relative(path: &Path, base: Option<&Path>) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

pub const COMPONENT_TEMPLATE: &str = r#"# {{title}}

> {{language}} component file `{{path}}`, generated {{generated_at}}

## Overview

{{description}}

## Components

{{entities}}

## Summary

{{entity_summaries}}

## Usage

```jsx
import { {{title}} } from './{{title}}';
```

## Metrics

- Lines: {{lines}}
- Branching complexity: {{complexity}}
- Code quality: {{quality}}
- Content hash: `{{content_hash}}`
"#;

pub const SERVICE_TEMPLATE: &str = r#"# {{title}} Service

> {{language}} service file `{{path}}`, generated {{generated_at}}

## Overview

{{description}}

## Operations

{{entities}}

## Summary

{{entity_summaries}}

## Usage

```ts
import {{title}} from './{{title}}';
```

## Metrics

- Lines: {{lines}}
- Branching complexity: {{complexity}}
- Code quality: {{quality}}
- Content hash: `{{content_hash}}`
"#;

pub const API_TEMPLATE: &str = r#"# {{title}}

> {{language}} source file, generated {{generated_at}}

## Overview

{{description}}

## API Reference

{{entities}}

## Summary

{{entity_summaries}}

## Location

```text
{{path}}
```

## Metrics

- Lines: {{lines}}
- Branching complexity: {{complexity}}
- Code quality: {{quality}}
- Content hash: `{{content_hash}}`
"#;

pub const MODULE_TEMPLATE: &str = r#"# Module: {{name}}

> {{file_count}} files, {{entity_count}} entities, generated {{generated_at}}

## Overview

{{description}}

## Files

```text
{{files}}
```

## Components

{{components}}

## Services

{{services}}

## Dependencies

{{dependencies}}
"#;

pub const ARCHITECTURE_TEMPLATE: &str = r#"# {{project}} Architecture

> {{module_count}} modules, {{file_count}} files, {{entity_count}} entities, generated {{generated_at}}

## Overview

{{description}}

## Modules

{{modules}}

## Architectural Patterns

{{patterns}}

## Key Dependencies

{{dependency_table}}

## Dependency Graph

```mermaid
{{dependency_graph}}
```
"#;
