// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RbacError {
    #[error("failed to list namespaces: {0}")]
    NamespaceList(#[source] kube::Error),

    #[error("manifest template {file}: {reason}")]
    Template { file: String, reason: String },

    #[error("failed to look up installer set for namespace {namespace}: {source}")]
    InstallerSetLookup {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to create installer set for namespace {namespace}: {source}")]
    InstallerSetCreate {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("RBAC reconciliation failed for {} namespace(s): {}", .0.len(), summarize(.0))]
    Partial(Vec<RbacError>),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

fn summarize(errors: &[RbacError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, RbacError>;
