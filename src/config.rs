// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the cluster-wide pipelines components are installed in
    pub target_namespace: String,
    /// Operator version stamped onto every installer set
    pub version: String,
    /// Directory holding the RBAC manifest templates
    pub manifest_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let target_namespace = env::var("TARGET_NAMESPACE")
            .context("TARGET_NAMESPACE environment variable not set")?;
        let manifest_dir: PathBuf = env::var("RBAC_MANIFEST_DIR")
            .context("RBAC_MANIFEST_DIR environment variable not set")?
            .into();
        // OPERATOR_VERSION overrides the baked-in crate version for dev builds
        let version =
            env::var("OPERATOR_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        Ok(Config {
            target_namespace,
            version,
            manifest_dir,
        })
    }
}
