// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use kube::CustomResource;
use serde::{Deserialize, Serialize};

use crate::constants::{installer_set, labels};

/// Cluster-scoped record that a bundle of managed resources has been applied.
///
/// One installer set exists per (namespace, component). Its labels are the
/// lookup key; the spec carries the rendered manifests. Installer sets are
/// created once and never mutated or deleted by this operator.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "operator.tekton.dev",
    version = "v1alpha1",
    kind = "TektonInstallerSet"
)]
#[serde(rename_all = "camelCase")]
pub struct TektonInstallerSetSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<serde_json::Value>,
}

impl TektonInstallerSet {
    /// Build the RBAC installer set for a namespace.
    ///
    /// The name is a stable function of the namespace as a debugging aid only;
    /// discovery always goes through the ownership labels.
    pub fn rbac_for_namespace(
        namespace: &str,
        version: &str,
        manifests: Vec<serde_json::Value>,
    ) -> Self {
        let mut set = TektonInstallerSet::new(
            &format!("{}-{}", installer_set::NAME_PREFIX, namespace),
            TektonInstallerSetSpec { manifests },
        );
        set.metadata.labels = Some(rbac_labels(namespace, version));
        set
    }
}

/// Labels stamped on every RBAC installer set this operator creates
pub fn rbac_labels(namespace: &str, version: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            labels::CREATED_BY.to_string(),
            installer_set::CREATED_BY_VALUE.to_string(),
        ),
        (
            labels::INSTALLER_SET_TYPE.to_string(),
            installer_set::COMPONENT_RBAC.to_string(),
        ),
        (labels::TARGET_NAMESPACE.to_string(), namespace.to_string()),
        (labels::RELEASE_VERSION.to_string(), version.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    #[test]
    fn test_rbac_for_namespace_derives_stable_name() {
        let set = TektonInstallerSet::rbac_for_namespace("test", "devel", vec![]);
        assert_eq!(set.name_any(), "rbac-resources-test");

        let again = TektonInstallerSet::rbac_for_namespace("test", "devel", vec![]);
        assert_eq!(set.name_any(), again.name_any());
    }

    #[test]
    fn test_rbac_for_namespace_sets_ownership_labels() {
        let set = TektonInstallerSet::rbac_for_namespace("test", "devel", vec![]);
        let set_labels = set.metadata.labels.expect("labels set");

        assert_eq!(
            set_labels.get(labels::CREATED_BY).map(String::as_str),
            Some(installer_set::CREATED_BY_VALUE)
        );
        assert_eq!(
            set_labels
                .get(labels::INSTALLER_SET_TYPE)
                .map(String::as_str),
            Some(installer_set::COMPONENT_RBAC)
        );
        assert_eq!(
            set_labels.get(labels::TARGET_NAMESPACE).map(String::as_str),
            Some("test")
        );
        assert_eq!(
            set_labels.get(labels::RELEASE_VERSION).map(String::as_str),
            Some("devel")
        );
    }

    #[test]
    fn test_rbac_for_namespace_carries_manifests() {
        let manifests = vec![serde_json::json!({
            "apiVersion": "v1",
            "kind": "ServiceAccount",
            "metadata": { "name": "pipeline", "namespace": "test" }
        })];

        let set = TektonInstallerSet::rbac_for_namespace("test", "devel", manifests.clone());
        assert_eq!(set.spec.manifests, manifests);
    }
}
