//! Mutations with refresh-after-write.

use std::future::Future;
use std::sync::Arc;

use hearth_core::error::{ErrorCategory, HearthError, Result, UserMessage, translate_error};
use thiserror::Error;

use crate::cache::{QueryCache, QueryKey};
use crate::notifier::{Notice, Notifier};

/// What a mutation touches and what to say when it succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationSpec {
    pub name: &'static str,
    /// Key prefixes to invalidate on success.
    pub invalidates: Vec<QueryKey>,
    pub success_notice: Option<String>,
}

impl MutationSpec {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            invalidates: Vec::new(),
            success_notice: None,
        }
    }

    pub fn invalidates(mut self, key: QueryKey) -> Self {
        self.invalidates.push(key);
        self
    }

    pub fn notice(mut self, text: impl Into<String>) -> Self {
        self.success_notice = Some(text.into());
        self
    }
}

/// A failed mutation: the translated message plus the underlying error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MutationFailure {
    pub message: UserMessage,
    pub error: HearthError,
}

impl MutationFailure {
    /// Wraps `error` with its display message.
    pub fn new(error: HearthError) -> Self {
        Self {
            message: user_message(&error),
            error,
        }
    }
}

impl From<MutationFailure> for HearthError {
    fn from(failure: MutationFailure) -> Self {
        failure.error
    }
}

/// Client-side validation messages are shown as written; everything else
/// goes through the translator.
fn user_message(error: &HearthError) -> UserMessage {
    match error {
        HearthError::Validation(text) => UserMessage {
            category: ErrorCategory::Validation,
            text: text.clone(),
        },
        other => translate_error(other),
    }
}

/// Runs mutations and keeps the cache consistent with their effects.
#[derive(Clone)]
pub struct MutationCoordinator {
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl MutationCoordinator {
    pub fn new(cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { cache, notifier }
    }

    /// Awaits `mutation`.
    ///
    /// On success every prefix in `spec.invalidates` is invalidated before
    /// returning and the success notice, if any, is sent. On failure the
    /// cache is left untouched and the translated error is sent as an error
    /// notice.
    pub async fn execute<T, Fut>(
        &self,
        spec: MutationSpec,
        mutation: Fut,
    ) -> std::result::Result<T, MutationFailure>
    where
        Fut: Future<Output = Result<T>>,
    {
        tracing::debug!("[Mutation] {} started", spec.name);
        match mutation.await {
            Ok(value) => {
                for prefix in &spec.invalidates {
                    self.cache.invalidate(prefix);
                }
                if let Some(text) = &spec.success_notice {
                    self.notifier.notify(Notice::success(text.clone()));
                }
                tracing::debug!("[Mutation] {} succeeded", spec.name);
                Ok(value)
            }
            Err(error) => {
                tracing::warn!("[Mutation] {} failed: {}", spec.name, error);
                let failure = MutationFailure::new(error);
                self.notifier.notify(Notice::error(failure.message.text.clone()));
                Err(failure)
            }
        }
    }
}
