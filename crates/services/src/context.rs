//! Shared collaborators of the services.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use vendorboard_cache::{CacheConfig, Mutation, QueryCache, QueryKey};
use vendorboard_client::{self as client, Backend};
use vendorboard_core::{ApiResponse, Notification};

use crate::error::{Result, ServiceError};
use crate::notify::Notifier;

/// Backend, cache and notifier shared by every service.
#[derive(Clone)]
pub struct ServiceContext {
    /// Remote data collaborator
    pub backend: Arc<dyn Backend>,

    /// Query cache
    pub cache: QueryCache<ServiceError>,

    /// Notification sink
    pub notifier: Arc<dyn Notifier>,
}

/// Notification text for a mutation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Feedback {
    pub success_title: &'static str,
    pub success_message: &'static str,
    pub failure_title: &'static str,
}

impl ServiceContext {
    /// Context with a fresh default cache.
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            cache: QueryCache::new(CacheConfig::default()),
            notifier,
        }
    }

    /// Use `cache` instead of the default one.
    pub fn with_cache(mut self, cache: QueryCache<ServiceError>) -> Self {
        self.cache = cache;
        self
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Cached read of `key`; `call` runs only when the cache must fetch.
    pub(crate) async fn read<T, F, Fut>(&self, key: &QueryKey, call: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce(Arc<dyn Backend>) -> Fut,
        Fut: Future<Output = client::Result<ApiResponse<T>>> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        self.cache
            .fetch(key, move || {
                let response = call(backend);
                async move { into_payload(response.await?) }
            })
            .await
    }

    /// Finish a mutation: notify, and invalidate when the server reports
    /// success.
    pub(crate) fn settle<T>(
        &self,
        response: client::Result<ApiResponse<T>>,
        mutation: Mutation,
        feedback: Feedback,
    ) -> Result<Option<T>> {
        match response {
            Ok(resp) if resp.success => {
                let scopes = mutation.invalidated_keys();
                let count = self.cache.invalidate_all(&scopes);
                debug!(?mutation, count, "mutation applied");
                self.notify(Notification::success(
                    feedback.success_title,
                    feedback.success_message,
                ));
                Ok(resp.data)
            }
            Ok(resp) => {
                let message = resp.failure_message();
                warn!(?mutation, %message, "mutation refused");
                self.notify(Notification::error(feedback.failure_title, message.clone()));
                Err(ServiceError::Rejected(message))
            }
            Err(err) => {
                warn!(?mutation, error = %err, "mutation failed");
                self.notify(Notification::error(feedback.failure_title, err.user_message()));
                Err(err.into())
            }
        }
    }
}

/// Payload of a successful envelope, or the server's failure message.
pub(crate) fn into_payload<T>(response: ApiResponse<T>) -> Result<T> {
    if !response.success {
        return Err(ServiceError::Rejected(response.failure_message()));
    }
    response
        .data
        .ok_or_else(|| ServiceError::Rejected("Response contained no data".to_string()))
}
