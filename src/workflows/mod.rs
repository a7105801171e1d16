// Business onboarding workflow
// New -> Market Approved | Market Declined -> Sales Approved -> Won | Lost

pub mod contact;
pub mod errors;
pub mod state_machine;
pub mod types;

pub use contact::{is_valid_phone, Contact};
pub use errors::{UnknownStageError, WorkflowError, ALLOWED_INDUSTRIES};
pub use state_machine::{BusinessWorkflow, ContactPolicy};
pub use types::{Business, BusinessEvent, Industry, Stage, StateTransitionRecord};
