// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;

use anyhow::Result;
use kube::Client;
use tracing::{info, warn};

use pipelines_rbac_operator::config::Config;
use pipelines_rbac_operator::rbac::{RbacReconciler, RbacRenderer};
use pipelines_rbac_operator::reconcilers::NamespaceReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting pipelines RBAC operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: target_namespace={} version={}",
        config.target_namespace, config.version
    );

    // Load and validate the manifest templates before touching the cluster
    let renderer = RbacRenderer::load(&config.manifest_dir)?;
    info!("Loaded RBAC manifest templates from {}", config.manifest_dir.display());

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let rbac = Arc::new(RbacReconciler::new(client.clone(), config, renderer));

    // Converge namespaces that already exist before watching for changes;
    // an incomplete pass is retried through the watch loop's requeue
    if let Err(e) = rbac.create_resources().await {
        warn!("Initial reconciliation pass incomplete: {}", e);
    }

    info!("Starting namespace reconciler...");
    NamespaceReconciler::new(client, rbac).run().await?;

    // This should never be reached as the reconciler runs forever
    warn!("Namespace reconciler stopped unexpectedly");
    Ok(())
}
