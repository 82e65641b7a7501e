// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! RBAC bundle rendering and per-namespace reconciliation.

pub mod reconciler;
pub mod render;

pub use reconciler::RbacReconciler;
pub use render::RbacRenderer;
