// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Manifest template loading and rendering

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{RbacError, Result};

/// Substitution variables templates may reference
const TEMPLATE_VARS: [&str; 3] = ["NAMESPACE", "TARGET_NAMESPACE", "VERSION"];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_]+)\}").expect("placeholder pattern"));

/// Renders the per-namespace RBAC bundle from on-disk YAML templates.
///
/// Templates are read once at load time and validated up front; rendering is a
/// pure function of (namespace, config) afterwards, so identical inputs always
/// produce identical bundles.
#[derive(Debug, Clone)]
pub struct RbacRenderer {
    templates: Vec<Template>,
}

#[derive(Debug, Clone)]
struct Template {
    file: String,
    content: String,
}

impl RbacRenderer {
    /// Load every `*.yaml` template under `dir`, in filename order.
    pub fn load(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|e| RbacError::Template {
            file: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "yaml"))
            .collect();
        paths.sort();

        let mut templates = Vec::with_capacity(paths.len());
        for path in paths {
            let file = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let content = fs::read_to_string(&path).map_err(|e| RbacError::Template {
                file: file.clone(),
                reason: e.to_string(),
            })?;
            let template = Template { file, content };
            template.validate()?;
            templates.push(template);
        }

        Ok(RbacRenderer { templates })
    }

    /// Render the RBAC bundle for one namespace.
    pub fn render(&self, namespace: &str, config: &Config) -> Result<Vec<serde_json::Value>> {
        let mut manifests = Vec::new();
        for template in &self.templates {
            manifests.extend(template.render(namespace, config)?);
        }
        Ok(manifests)
    }
}

impl Template {
    /// Reject unknown placeholders and unparseable YAML at load time; a broken
    /// template is a configuration error, not a per-namespace one.
    fn validate(&self) -> Result<()> {
        for capture in PLACEHOLDER.captures_iter(&self.content) {
            let var = &capture[1];
            if !TEMPLATE_VARS.contains(&var) {
                return Err(RbacError::Template {
                    file: self.file.clone(),
                    reason: format!("undefined substitution variable ${{{var}}}"),
                });
            }
        }
        // Probe with placeholder values so substitution-dependent YAML is parsed too
        self.render_docs("default", "default", "0.0.0").map(|_| ())
    }

    fn render(&self, namespace: &str, config: &Config) -> Result<Vec<serde_json::Value>> {
        self.render_docs(namespace, &config.target_namespace, &config.version)
    }

    fn render_docs(
        &self,
        namespace: &str,
        target_namespace: &str,
        version: &str,
    ) -> Result<Vec<serde_json::Value>> {
        let rendered = self
            .content
            .replace("${NAMESPACE}", namespace)
            .replace("${TARGET_NAMESPACE}", target_namespace)
            .replace("${VERSION}", version);

        let mut docs = Vec::new();
        for document in serde_yaml::Deserializer::from_str(&rendered) {
            let value =
                serde_json::Value::deserialize(document).map_err(|e| RbacError::Template {
                    file: self.file.clone(),
                    reason: e.to_string(),
                })?;
            if !value.is_null() {
                docs.push(value);
            }
        }
        Ok(docs)
    }
}
