// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Installer set discovery and creation

use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument, warn};

use crate::constants::{installer_set, labels};
use crate::types::TektonInstallerSet;

/// Label selector for the RBAC installer set owned by this operator for one
/// namespace. Exact-match conjunction; lookups never go by name.
pub fn rbac_installer_set_selector(namespace: &str) -> String {
    format!(
        "{}={},{}={},{}={}",
        labels::CREATED_BY,
        installer_set::CREATED_BY_VALUE,
        labels::INSTALLER_SET_TYPE,
        installer_set::COMPONENT_RBAC,
        labels::TARGET_NAMESPACE,
        namespace,
    )
}

/// Find the name of the installer set matching a label selector, if any.
///
/// More than one match means an earlier pass failed partway through; that is
/// non-fatal but logged, and the lexicographically smallest name wins so every
/// pass resolves the same survivor.
#[instrument(skip(client))]
pub async fn current_installer_set_name(
    client: &Client,
    selector: &str,
) -> kube::Result<Option<String>> {
    let installer_sets: Api<TektonInstallerSet> = Api::all(client.clone());
    let matching = installer_sets
        .list(&ListParams::default().labels(selector))
        .await?;

    let mut names: Vec<String> = matching.items.iter().map(ResourceExt::name_any).collect();
    if names.len() > 1 {
        warn!(
            "{} installer sets match selector {}: {:?}",
            names.len(),
            selector,
            names
        );
    }
    names.sort();
    Ok(names.into_iter().next())
}

/// Create an installer set, treating AlreadyExists as success: a concurrent
/// reconciliation pass already produced the desired state.
#[instrument(skip(client, set), fields(name = %set.name_any()))]
pub async fn create_installer_set(client: &Client, set: &TektonInstallerSet) -> kube::Result<()> {
    let installer_sets: Api<TektonInstallerSet> = Api::all(client.clone());

    match installer_sets.create(&PostParams::default(), set).await {
        Ok(created) => {
            info!("Created installer set {}", created.name_any());
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            debug!("Installer set {} already exists", set.name_any());
            Ok(())
        }
        Err(e) => Err(e),
    }
}
