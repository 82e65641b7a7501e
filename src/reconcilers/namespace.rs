// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Namespace reconciler - watches namespaces and provisions RBAC for eligible ones.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use tracing::{debug, error, warn};

use crate::constants::requeue;
use crate::error::{RbacError, Result};
use crate::kubernetes::requires_rbac_reconciliation;
use crate::rbac::RbacReconciler;

pub struct NamespaceReconciler {
    client: Client,
    rbac: Arc<RbacReconciler>,
}

impl NamespaceReconciler {
    pub fn new(client: Client, rbac: Arc<RbacReconciler>) -> Self {
        Self { client, rbac }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());

        Controller::new(namespaces, WatcherConfig::default())
            .run(reconcile, error_policy, self.rbac)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled namespace: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

async fn reconcile(namespace: Arc<Namespace>, ctx: Arc<RbacReconciler>) -> Result<Action> {
    let name = namespace.name_any();

    if !requires_rbac_reconciliation(&namespace) {
        debug!("Namespace {} not in scope for RBAC, skipping", name);
        return Ok(Action::await_change());
    }

    debug!("Reconciling RBAC for namespace: {}", name);
    ctx.ensure_namespace_rbac(&namespace).await?;

    // Periodic resync re-checks the namespace even without watch events
    Ok(Action::requeue(Duration::from_secs(requeue::RESYNC_SECS)))
}

fn error_policy(_namespace: Arc<Namespace>, error: &RbacError, _ctx: Arc<RbacReconciler>) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(requeue::ERROR_RETRY_SECS))
}
