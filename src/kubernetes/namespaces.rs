// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Namespace selection for RBAC reconciliation

use std::sync::LazyLock;

use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api, Client, ResourceExt};
use regex::Regex;
use tracing::instrument;

use crate::constants::{annotations, labels};
use crate::error::{RbacError, Result};

/// Namespaces reserved for cluster internals, never reconciled
static SYSTEM_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(openshift|kube)-").expect("system namespace pattern"));

/// Decide whether a namespace needs managed RBAC state.
///
/// System namespaces and namespaces being deleted are always out of scope.
/// Everything else opts in through the SCC annotation or the legacy
/// reconcile-version label; either key counts, even with an empty value.
pub fn requires_rbac_reconciliation(namespace: &Namespace) -> bool {
    if SYSTEM_NAMESPACE.is_match(&namespace.name_any()) {
        return false;
    }
    if namespace.metadata.deletion_timestamp.is_some() {
        return false;
    }

    let has_scc_annotation = namespace
        .metadata
        .annotations
        .as_ref()
        .is_some_and(|a| a.contains_key(annotations::SCC));
    let has_reconcile_label = namespace
        .metadata
        .labels
        .as_ref()
        .is_some_and(|l| l.contains_key(labels::NAMESPACE_RECONCILE_VERSION));

    has_scc_annotation || has_reconcile_label
}

/// List the namespaces in scope for a reconciliation pass, preserving the API
/// server's ordering. An empty result is valid.
#[instrument(skip(client))]
pub async fn namespaces_to_reconcile(client: &Client) -> Result<Vec<Namespace>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let namespace_list = namespaces
        .list(&ListParams::default())
        .await
        .map_err(RbacError::NamespaceList)?;

    Ok(namespace_list
        .items
        .into_iter()
        .filter(requires_rbac_reconciliation)
        .collect())
}
