// Copyright 2026 The pipelines-rbac-operator Authors
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

use crate::types::installer_set::rbac_labels;

/// API paths the operator touches, for route registration in tests
pub mod paths {
    pub const NAMESPACES: &str = "/api/v1/namespaces";
    pub const INSTALLER_SETS: &str = "/apis/operator.tekton.dev/v1alpha1/tektoninstallersets";
}

/// A canned response together with its matching rules
#[derive(Clone)]
struct MockRoute {
    method: String,
    path: String,
    label_selector: Option<String>,
    body_contains: Option<String>,
    status: u16,
    body: String,
}

/// A request the mock service has served, for assertions on call counts
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub label_selector: Option<String>,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses matched on request
/// method, path, `labelSelector` query, and body content. Routes are tried in
/// registration order; the first match wins.
#[derive(Clone)]
pub struct MockService {
    routes: Arc<Mutex<Vec<MockRoute>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.push(MockRoute {
            method: "GET".to_string(),
            path: path.to_string(),
            label_selector: None,
            body_contains: None,
            status,
            body: body.to_string(),
        });
        self
    }

    /// Add a response for GET requests matching the path and `labelSelector` query
    pub fn on_get_with_selector(self, path: &str, selector: &str, status: u16, body: &str) -> Self {
        self.push(MockRoute {
            method: "GET".to_string(),
            path: path.to_string(),
            label_selector: Some(selector.to_string()),
            body_contains: None,
            status,
            body: body.to_string(),
        });
        self
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.push(MockRoute {
            method: "POST".to_string(),
            path: path.to_string(),
            label_selector: None,
            body_contains: None,
            status,
            body: body.to_string(),
        });
        self
    }

    /// Add a response for POST requests whose body contains `needle`
    pub fn on_post_containing(self, path: &str, needle: &str, status: u16, body: &str) -> Self {
        self.push(MockRoute {
            method: "POST".to_string(),
            path: path.to_string(),
            label_selector: None,
            body_contains: Some(needle.to_string()),
            status,
            body: body.to_string(),
        });
        self
    }

    /// Build a kube Client from this mock service. Clone the mock first if the
    /// test also needs to inspect recorded requests.
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Requests served so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests served with the given method and exact path
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn push(&self, route: MockRoute) {
        self.routes.lock().unwrap().push(route);
    }

    fn find_response(&self, request: &RecordedRequest) -> Option<(u16, String)> {
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|route| {
                route.method == request.method
                    && route.path == request.path
                    && route
                        .label_selector
                        .as_ref()
                        .map_or(true, |s| request.label_selector.as_deref() == Some(s))
                    && route
                        .body_contains
                        .as_ref()
                        .map_or(true, |needle| request.body.contains(needle))
            })
            .map(|route| (route.status, route.body.clone()))
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let service = self.clone();

        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let label_selector = req.uri().query().and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == "labelSelector")
                    .map(|(_, value)| value.into_owned())
            });
            let body = match req.into_body().collect().await {
                Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
                Err(_) => String::new(),
            };

            let request = RecordedRequest {
                method,
                path,
                label_selector,
                body,
            };
            let response = service.find_response(&request);
            service.requests.lock().unwrap().push(request);

            match response {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => {
                    // Default 404 for unmatched requests
                    let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
                    Ok(Response::builder()
                        .status(404)
                        .header("content-type", "application/json")
                        .body(Body::from(body.as_bytes().to_vec()))
                        .unwrap())
                }
            }
        })
    }
}

/// Create a mock namespace object
pub fn namespace_json(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name }
    })
}

/// Create a mock namespace object carrying annotations
pub fn namespace_with_annotations_json(name: &str, annotations: &[(&str, &str)]) -> Value {
    let annotations: BTreeMap<&str, &str> = annotations.iter().copied().collect();
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name, "annotations": annotations }
    })
}

/// Create a mock namespace object carrying labels
pub fn namespace_with_labels_json(name: &str, labels: &[(&str, &str)]) -> Value {
    let labels: BTreeMap<&str, &str> = labels.iter().copied().collect();
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": { "name": name, "labels": labels }
    })
}

/// Create a mock namespace object that is being deleted
pub fn terminating_namespace_json(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "annotations": { (crate::constants::annotations::SCC): "restricted" },
            "deletionTimestamp": "2026-08-08T00:00:00Z"
        }
    })
}

/// Create a mock namespace list response
pub fn namespace_list_json(items: &[Value]) -> String {
    json!({
        "apiVersion": "v1",
        "kind": "NamespaceList",
        "metadata": { "resourceVersion": "" },
        "items": items
    })
    .to_string()
}

/// Create a mock installer set object labeled for a namespace
pub fn installer_set_json(name: &str, namespace: &str) -> Value {
    let set_labels = rbac_labels(namespace, "devel");
    json!({
        "apiVersion": "operator.tekton.dev/v1alpha1",
        "kind": "TektonInstallerSet",
        "metadata": { "name": name, "labels": set_labels },
        "spec": { "manifests": [] }
    })
}

/// Create a mock installer set list response
pub fn installer_set_list_json(items: &[Value]) -> String {
    json!({
        "apiVersion": "operator.tekton.dev/v1alpha1",
        "kind": "TektonInstallerSetList",
        "metadata": { "resourceVersion": "" },
        "items": items
    })
    .to_string()
}

/// Create a status failure response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create an AlreadyExists conflict response
pub fn already_exists_json(name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!("tektoninstallersets.operator.tekton.dev \"{name}\" already exists"),
    )
}
