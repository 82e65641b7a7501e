// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0
pub mod installer_set;

pub use installer_set::{TektonInstallerSet, TektonInstallerSetSpec};
