// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API access: namespace selection and installer set tracking.

pub mod installer_sets;
pub mod namespaces;

pub use installer_sets::{
    create_installer_set, current_installer_set_name, rbac_installer_set_selector,
};
pub use namespaces::{namespaces_to_reconcile, requires_rbac_reconciliation};
