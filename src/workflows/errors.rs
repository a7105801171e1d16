use thiserror::Error;

use super::types::Stage;

pub const ALLOWED_INDUSTRIES: &str = "restaurants, stores, wholesale, services";

/// Validation failures raised by workflow transitions.
///
/// These are permanent for the given input; the caller has to correct the
/// input rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Invalid Phone number. Contact should be 11 digits long")]
    InvalidPhone { phone: String },

    #[error("This industry cannot be added to the system. Allowed industries: {}", ALLOWED_INDUSTRIES)]
    InvalidIndustry { industry: String },

    #[error("Workflow already complete. Current Stage is: {stage}")]
    WorkflowComplete { stage: Stage },

    #[error("Only Sales Approved Business can be Won or Lost")]
    OnlyFromSalesApproved { stage: Stage },

    #[error("Invalid stage {stage}. A workflow can only be completed as Won or Lost")]
    InvalidFinalStage { stage: Stage },
}

impl WorkflowError {
    /// Stable identifier for transport layers
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InvalidPhone { .. } => "invalid_phone",
            WorkflowError::InvalidIndustry { .. } => "invalid_industry",
            WorkflowError::WorkflowComplete { .. } => "workflow_complete",
            WorkflowError::OnlyFromSalesApproved { .. } => "only_from_sales_approved",
            WorkflowError::InvalidFinalStage { .. } => "invalid_final_stage",
        }
    }
}

/// A stage label outside the six known stages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid stage: {0}")]
pub struct UnknownStageError(pub String);
