// Business onboarding workflow library
// Exposes the workflow core, next-step advisories, storage and the request layer

pub mod advisor;
pub mod config;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use advisor::{next_step, next_step_for, Advisory};
pub use config::{config, init_config, OnboardingConfig};
pub use service::{ErrorResponse, OnboardingService, ServiceError, StepResponse};
pub use storage::{BusinessStore, InMemoryStore, JsonDirStore, StoreError};
pub use telemetry::{create_business_span, generate_correlation_id, init_telemetry};
pub use workflows::{
    is_valid_phone, Business, BusinessEvent, BusinessWorkflow, Contact, ContactPolicy, Industry,
    Stage, UnknownStageError, WorkflowError,
};
