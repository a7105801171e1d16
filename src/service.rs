//! Request-handling layer over the workflow core.
//!
//! Each call resolves a business from the store, runs one workflow operation,
//! persists the snapshot on success and answers with the next-step advisory.
//! The business is resolved before the request body is checked, so an unknown
//! FEIN always reports NotFound. Rejections are never persisted. Mutations of
//! one FEIN are serialized; the core itself does no locking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, Instrument};

use crate::advisor::{next_step, Advisory};
use crate::storage::{BusinessStore, StoreError};
use crate::telemetry::{create_business_span, generate_correlation_id};
use crate::workflows::{Business, BusinessWorkflow, Stage, WorkflowError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("No Business in records with fein: {0}")]
    NotFound(String),

    #[error("Business already exists")]
    AlreadyExists(String),

    #[error("Invalid stage. This API accepts {{\"stage\": \"Lost|Won\"}}")]
    InvalidCompletionStage(String),

    /// The workflow refused the transition; `next_step` describes the
    /// unchanged current stage.
    #[error("{error}")]
    Rejected {
        error: WorkflowError,
        next_step: Advisory,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(fein) => ServiceError::NotFound(fein),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn next_step(&self) -> Option<&Advisory> {
        match self {
            ServiceError::Rejected { next_step, .. } => Some(next_step),
            _ => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            next_step: self.next_step().cloned(),
        }
    }
}

/// Body returned for a failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<Advisory>,
}

/// Body returned for a successful mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResponse {
    pub fein: String,
    pub message: String,
    pub next_step: Advisory,
}

pub struct OnboardingService<S> {
    store: S,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: BusinessStore> OnboardingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create_business(&self, name: &str, fein: &str) -> Result<StepResponse, ServiceError> {
        let span = create_business_span("create_business", fein, &generate_correlation_id());
        async move {
            let name = required("name", name)?;
            let fein = required("fein", fein)?;

            let key_lock = self.key_lock(fein).await;
            let result = {
                let _guard = key_lock.lock().await;
                self.create_locked(name, fein).await
            };
            self.release_key(fein, key_lock).await;
            result
        }
        .instrument(span)
        .await
    }

    async fn create_locked(&self, name: &str, fein: &str) -> Result<StepResponse, ServiceError> {
        if self.store.contains(fein).await? {
            return Err(ServiceError::AlreadyExists(fein.to_string()));
        }

        let workflow = BusinessWorkflow::new(name, fein);
        self.store.put(fein, workflow.snapshot()).await?;
        info!(fein = %fein, "Business created");

        Ok(StepResponse {
            fein: fein.to_string(),
            message: "Business created.".to_string(),
            next_step: next_step(workflow.stage(), fein),
        })
    }

    pub async fn get_business(&self, fein: &str) -> Result<Business, ServiceError> {
        Ok(self.store.get(fein).await?)
    }

    pub async fn add_industry(&self, fein: &str, industry: &str) -> Result<StepResponse, ServiceError> {
        let span = create_business_span("add_industry", fein, &generate_correlation_id());
        async move {
            self.apply(fein, "Industry Added.", Ok(()), |workflow, ()| {
                workflow.set_industry(industry)
            })
            .await
        }
        .instrument(span)
        .await
    }

    pub async fn add_contact(
        &self,
        fein: &str,
        name: &str,
        phone: &str,
    ) -> Result<StepResponse, ServiceError> {
        let span = create_business_span("add_contact", fein, &generate_correlation_id());
        async move {
            self.apply(fein, "Contact Added.", Ok(()), |workflow, ()| {
                workflow.set_contact(name, phone)
            })
            .await
        }
        .instrument(span)
        .await
    }

    pub async fn complete_process(&self, fein: &str, stage: &str) -> Result<StepResponse, ServiceError> {
        let span = create_business_span("complete_process", fein, &generate_correlation_id());
        async move {
            let target = match stage.parse::<Stage>() {
                Ok(target) if target.is_final_outcome() => Ok(target),
                _ => Err(ServiceError::InvalidCompletionStage(stage.to_string())),
            };
            self.apply(fein, "Status updated", target, |workflow, target| {
                workflow.finalize(target)
            })
            .await
        }
        .instrument(span)
        .await
    }

    /// Run one workflow operation under the FEIN's lock. `request` carries the
    /// parsed request body; its error is only reported once the business exists.
    async fn apply<T, F>(
        &self,
        fein: &str,
        message: &str,
        request: Result<T, ServiceError>,
        operation: F,
    ) -> Result<StepResponse, ServiceError>
    where
        T: Send,
        F: FnOnce(&mut BusinessWorkflow, T) -> Result<Stage, WorkflowError> + Send,
    {
        let key_lock = self.key_lock(fein).await;
        let result = {
            let _guard = key_lock.lock().await;
            self.apply_locked(fein, message, request, operation).await
        };
        self.release_key(fein, key_lock).await;
        result
    }

    async fn apply_locked<T, F>(
        &self,
        fein: &str,
        message: &str,
        request: Result<T, ServiceError>,
        operation: F,
    ) -> Result<StepResponse, ServiceError>
    where
        T: Send,
        F: FnOnce(&mut BusinessWorkflow, T) -> Result<Stage, WorkflowError> + Send,
    {
        let business = self.store.get(fein).await?;
        let request = request?;
        let mut workflow = BusinessWorkflow::from_snapshot(business);

        if let Err(error) = operation(&mut workflow, request) {
            return Err(ServiceError::Rejected {
                error,
                next_step: next_step(workflow.stage(), fein),
            });
        }

        let business = workflow.into_snapshot();
        self.store.put(fein, &business).await?;

        Ok(StepResponse {
            fein: fein.to_string(),
            message: message.to_string(),
            next_step: next_step(business.stage, fein),
        })
    }

    async fn key_lock(&self, fein: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(fein.to_string())
            .or_default()
            .clone()
    }

    /// Drop the registry entry once no other request holds or waits on it.
    async fn release_key(&self, fein: &str, key_lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        drop(key_lock);
        if locks
            .get(fein)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(fein);
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ServiceError> {
    if value.trim().is_empty() {
        Err(ServiceError::MissingField(field))
    } else {
        Ok(value)
    }
}
