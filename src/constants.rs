// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys consumed by the operator
pub mod annotations {
    /// Opt-in marker for SCC-managed pipeline namespaces; presence alone opts in
    pub const SCC: &str = "operator.tekton.dev/scc";
}

/// Kubernetes label keys consumed and written by the operator
pub mod labels {
    /// Legacy per-namespace reconcile marker; presence alone opts in
    pub const NAMESPACE_RECONCILE_VERSION: &str =
        "openshift-pipelines.tekton.dev/namespace-reconcile-version";
    /// Ownership marker on installer sets created by this operator
    pub const CREATED_BY: &str = "operator.tekton.dev/created-by";
    /// Component marker distinguishing installer set flavors
    pub const INSTALLER_SET_TYPE: &str = "operator.tekton.dev/type";
    /// Namespace an installer set's bundle was rendered for
    pub const TARGET_NAMESPACE: &str = "operator.tekton.dev/target-namespace";
    /// Operator version that rendered the installer set's bundle
    pub const RELEASE_VERSION: &str = "operator.tekton.dev/release-version";
}

/// Label values and naming for the RBAC installer sets owned by this operator
pub mod installer_set {
    pub const CREATED_BY_VALUE: &str = "RbacDependencies";
    pub const COMPONENT_RBAC: &str = "rhosp-rbac";
    /// Prefix for the deterministic per-namespace installer set name
    pub const NAME_PREFIX: &str = "rbac-resources";
}

/// Requeue configuration for the namespace watch loop
pub mod requeue {
    /// Seconds before retrying a namespace whose reconciliation errored
    pub const ERROR_RETRY_SECS: u64 = 60;
    /// Seconds between periodic re-reconciles of an eligible namespace
    pub const RESYNC_SECS: u64 = 600;
}

/// Upper bound on namespaces reconciled concurrently within one pass
pub const MAX_CONCURRENT_RECONCILES: usize = 4;
