// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation pass over eligible namespaces

use futures::{stream, StreamExt};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Client, ResourceExt};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::constants::MAX_CONCURRENT_RECONCILES;
use crate::error::{RbacError, Result};
use crate::kubernetes::{
    create_installer_set, current_installer_set_name, namespaces_to_reconcile,
    rbac_installer_set_selector,
};
use crate::rbac::render::RbacRenderer;
use crate::types::TektonInstallerSet;

/// Drives RBAC provisioning across all eligible namespaces.
pub struct RbacReconciler {
    client: Client,
    config: Config,
    renderer: RbacRenderer,
}

impl RbacReconciler {
    pub fn new(client: Client, config: Config, renderer: RbacRenderer) -> Self {
        Self {
            client,
            config,
            renderer,
        }
    }

    /// Run one full reconciliation pass.
    ///
    /// Namespaces are processed independently with bounded concurrency; a
    /// failure in one never blocks the others. Per-namespace failures are
    /// collected into a single aggregate error so the caller requeues the
    /// pass; the existence check keeps the retry from redoing finished work.
    #[instrument(skip(self))]
    pub async fn create_resources(&self) -> Result<()> {
        let namespaces = namespaces_to_reconcile(&self.client).await?;
        if namespaces.is_empty() {
            debug!("No namespaces require RBAC reconciliation");
            return Ok(());
        }

        info!("Reconciling RBAC for {} namespace(s)", namespaces.len());

        let outcomes: Vec<(String, Result<()>)> = stream::iter(namespaces)
            .map(|namespace| async move {
                let name = namespace.name_any();
                let outcome = self.ensure_namespace_rbac(&namespace).await;
                (name, outcome)
            })
            .buffer_unordered(MAX_CONCURRENT_RECONCILES)
            .collect()
            .await;

        let mut failures = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(()) => {}
                // A broken template affects every namespace equally; surface it whole
                Err(err @ RbacError::Template { .. }) => return Err(err),
                Err(err) => {
                    error!("Failed to reconcile RBAC for namespace {}: {}", name, err);
                    failures.push(err);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RbacError::Partial(failures))
        }
    }

    /// Bring one namespace's RBAC installer set into existence if it is not
    /// there yet. Check-then-create within a namespace; the create tolerates
    /// losing a race to a concurrent pass.
    #[instrument(skip(self, namespace), fields(namespace = %namespace.name_any()))]
    pub async fn ensure_namespace_rbac(&self, namespace: &Namespace) -> Result<()> {
        let name = namespace.name_any();
        let selector = rbac_installer_set_selector(&name);

        let existing = current_installer_set_name(&self.client, &selector)
            .await
            .map_err(|source| RbacError::InstallerSetLookup {
                namespace: name.clone(),
                source,
            })?;

        if let Some(existing) = existing {
            debug!("Installer set {} already covers namespace {}", existing, name);
            return Ok(());
        }

        let manifests = self.renderer.render(&name, &self.config)?;
        let set = TektonInstallerSet::rbac_for_namespace(&name, &self.config.version, manifests);

        create_installer_set(&self.client, &set)
            .await
            .map_err(|source| RbacError::InstallerSetCreate {
                namespace: name,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{annotations, labels};
    use crate::test_utils::{
        already_exists_json, installer_set_json, installer_set_list_json, namespace_json,
        namespace_list_json, namespace_with_annotations_json, namespace_with_labels_json, paths,
        status_json, MockService,
    };
    use std::path::PathBuf;

    fn make_reconciler(mock: &MockService) -> RbacReconciler {
        let config = Config {
            target_namespace: "foo".to_string(),
            version: "devel".to_string(),
            manifest_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("manifests/rbac"),
        };
        let renderer = RbacRenderer::load(&config.manifest_dir).unwrap();
        RbacReconciler::new(mock.clone().into_client(), config, renderer)
    }

    fn reconcile_marked_namespace_json(name: &str) -> serde_json::Value {
        namespace_with_labels_json(name, &[(labels::NAMESPACE_RECONCILE_VERSION, "")])
    }

    fn empty_lookup(mock: MockService, namespace: &str) -> MockService {
        mock.on_get_with_selector(
            paths::INSTALLER_SETS,
            &rbac_installer_set_selector(namespace),
            200,
            &installer_set_list_json(&[]),
        )
    }

    #[tokio::test]
    async fn test_no_eligible_namespaces_is_a_noop() {
        let mock = MockService::new().on_get(
            paths::NAMESPACES,
            200,
            &namespace_list_json(&[
                namespace_json("openshift-test"),
                namespace_json("unmarked"),
            ]),
        );
        let reconciler = make_reconciler(&mock);

        reconciler.create_resources().await.unwrap();

        assert_eq!(mock.request_count("GET", paths::INSTALLER_SETS), 0);
        assert_eq!(mock.request_count("POST", paths::INSTALLER_SETS), 0);
    }

    #[tokio::test]
    async fn test_creates_installer_set_for_eligible_namespace() {
        let mut mock = MockService::new().on_get(
            paths::NAMESPACES,
            200,
            &namespace_list_json(&[reconcile_marked_namespace_json("test")]),
        );
        mock = empty_lookup(mock, "test").on_post(
            paths::INSTALLER_SETS,
            201,
            &installer_set_json("rbac-resources-test", "test").to_string(),
        );
        let reconciler = make_reconciler(&mock);

        reconciler.create_resources().await.unwrap();

        assert_eq!(mock.request_count("POST", paths::INSTALLER_SETS), 1);
        let create = mock
            .requests()
            .into_iter()
            .find(|r| r.method == "POST")
            .unwrap();
        assert!(create.body.contains("rbac-resources-test"));
        assert!(create
            .body
            .contains(&format!("\"{}\":\"test\"", labels::TARGET_NAMESPACE)));
        assert!(create
            .body
            .contains(&format!("\"{}\":\"rhosp-rbac\"", labels::INSTALLER_SET_TYPE)));
    }

    #[tokio::test]
    async fn test_creates_one_installer_set_per_namespace() {
        let mut mock = MockService::new().on_get(
            paths::NAMESPACES,
            200,
            &namespace_list_json(&[
                reconcile_marked_namespace_json("test1"),
                reconcile_marked_namespace_json("test2"),
                namespace_with_annotations_json("test3", &[(annotations::SCC, "restricted")]),
            ]),
        );
        for namespace in ["test1", "test2", "test3"] {
            mock = empty_lookup(mock, namespace);
        }
        mock = mock.on_post(
            paths::INSTALLER_SETS,
            201,
            &installer_set_json("rbac-resources-test1", "test1").to_string(),
        );
        let reconciler = make_reconciler(&mock);

        reconciler.create_resources().await.unwrap();

        assert_eq!(mock.request_count("POST", paths::INSTALLER_SETS), 3);
        let bodies: Vec<String> = mock
            .requests()
            .into_iter()
            .filter(|r| r.method == "POST")
            .map(|r| r.body)
            .collect();
        for namespace in ["test1", "test2", "test3"] {
            assert!(
                bodies
                    .iter()
                    .any(|b| b.contains(&format!("rbac-resources-{namespace}"))),
                "no installer set created for {namespace}"
            );
        }
    }

    #[tokio::test]
    async fn test_existing_installer_set_skips_creation() {
        let mock = MockService::new()
            .on_get(
                paths::NAMESPACES,
                200,
                &namespace_list_json(&[reconcile_marked_namespace_json("test")]),
            )
            .on_get_with_selector(
                paths::INSTALLER_SETS,
                &rbac_installer_set_selector("test"),
                200,
                &installer_set_list_json(&[installer_set_json("rbac-resources-test", "test")]),
            );
        let reconciler = make_reconciler(&mock);

        reconciler.create_resources().await.unwrap();

        assert_eq!(mock.request_count("POST", paths::INSTALLER_SETS), 0);
    }

    #[tokio::test]
    async fn test_create_race_is_not_an_error() {
        let mut mock = MockService::new().on_get(
            paths::NAMESPACES,
            200,
            &namespace_list_json(&[reconcile_marked_namespace_json("test")]),
        );
        mock = empty_lookup(mock, "test").on_post(
            paths::INSTALLER_SETS,
            409,
            &already_exists_json("rbac-resources-test"),
        );
        let reconciler = make_reconciler(&mock);

        reconciler.create_resources().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_namespace_does_not_block_others() {
        let mut mock = MockService::new().on_get(
            paths::NAMESPACES,
            200,
            &namespace_list_json(&[
                reconcile_marked_namespace_json("test1"),
                reconcile_marked_namespace_json("test2"),
            ]),
        );
        mock = empty_lookup(mock, "test1");
        mock = empty_lookup(mock, "test2")
            // Specific route first: creates for test1 fail, everything else succeeds
            .on_post_containing(
                paths::INSTALLER_SETS,
                "rbac-resources-test1",
                500,
                &status_json(500, "InternalError", "write failed"),
            )
            .on_post(
                paths::INSTALLER_SETS,
                201,
                &installer_set_json("rbac-resources-test2", "test2").to_string(),
            );
        let reconciler = make_reconciler(&mock);

        let err = reconciler.create_resources().await.unwrap_err();
        match &err {
            RbacError::Partial(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(
                    failures[0],
                    RbacError::InstallerSetCreate { ref namespace, .. } if namespace == "test1"
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Both namespaces were attempted
        assert_eq!(mock.request_count("POST", paths::INSTALLER_SETS), 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_skips_namespace_but_continues() {
        let mut mock = MockService::new()
            .on_get(
                paths::NAMESPACES,
                200,
                &namespace_list_json(&[
                    reconcile_marked_namespace_json("test1"),
                    reconcile_marked_namespace_json("test2"),
                ]),
            )
            .on_get_with_selector(
                paths::INSTALLER_SETS,
                &rbac_installer_set_selector("test1"),
                500,
                &status_json(500, "InternalError", "boom"),
            );
        mock = empty_lookup(mock, "test2").on_post(
            paths::INSTALLER_SETS,
            201,
            &installer_set_json("rbac-resources-test2", "test2").to_string(),
        );
        let reconciler = make_reconciler(&mock);

        let err = reconciler.create_resources().await.unwrap_err();
        match &err {
            RbacError::Partial(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(
                    failures[0],
                    RbacError::InstallerSetLookup { ref namespace, .. } if namespace == "test1"
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The healthy namespace still got its installer set
        assert_eq!(mock.request_count("POST", paths::INSTALLER_SETS), 1);
        let create = mock
            .requests()
            .into_iter()
            .find(|r| r.method == "POST")
            .unwrap();
        assert!(create.body.contains("rbac-resources-test2"));
    }

    #[tokio::test]
    async fn test_list_failure_aborts_the_pass() {
        let mock = MockService::new().on_get(
            paths::NAMESPACES,
            500,
            &status_json(500, "InternalError", "boom"),
        );
        let reconciler = make_reconciler(&mock);

        let err = reconciler.create_resources().await.unwrap_err();
        assert!(matches!(err, RbacError::NamespaceList(_)));
        assert_eq!(mock.request_count("GET", paths::INSTALLER_SETS), 0);
    }
}
