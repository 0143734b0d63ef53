use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::matrix::error::MatrixError;

/// Sends one authenticated request to the homeserver and returns its JSON body.
///
/// Implementations must turn any non-success status into an error. Nothing
/// layered on top of a dispatcher retries, caches, or reinterprets errors.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    async fn do_request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<Value>,
    ) -> Result<Value, MatrixError>;
}

#[async_trait]
impl<T: RequestDispatcher + ?Sized> RequestDispatcher for Arc<T> {
    async fn do_request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<Value>,
    ) -> Result<Value, MatrixError> {
        (**self).do_request(method, path, query, body).await
    }
}

#[async_trait]
impl<T: RequestDispatcher + ?Sized> RequestDispatcher for &T {
    async fn do_request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<Value>,
    ) -> Result<Value, MatrixError> {
        (**self).do_request(method, path, query, body).await
    }
}
