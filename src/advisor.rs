//! Next-step advisories.
//!
//! Pure lookup from a stage to what the caller is expected to do next. Safe to
//! call after any transition, including rejected ones.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::workflows::{Stage, UnknownStageError};

/// What the caller should do next for a business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub message: String,
    /// Follow-up route, absent once the workflow is over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Example request body for `action`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Advisory {
    fn step(message: &str, action: String, payload: Value) -> Self {
        Self {
            message: message.to_string(),
            action: Some(action),
            payload: Some(payload),
        }
    }

    fn terminal(message: &str) -> Self {
        Self {
            message: message.to_string(),
            action: None,
            payload: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.action.is_none()
    }
}

pub fn next_step(stage: Stage, fein: &str) -> Advisory {
    match stage {
        Stage::New => Advisory::step(
            "Provide a valid industry.",
            format!("/business/{fein}/industry/"),
            json!({"industry": "<name>"}),
        ),
        Stage::MarketApproved => Advisory::step(
            "Provide a valid contact.",
            format!("/business/{fein}/contact/"),
            json!({"contact": {"name": "<name>", "phone": "<11 digits>"}}),
        ),
        Stage::SalesApproved => Advisory::step(
            "Move to Won or Lost.",
            format!("/business/{fein}/complete_process/"),
            json!({"stage": "Won|Lost"}),
        ),
        Stage::MarketDeclined => Advisory::terminal("No further steps."),
        Stage::Won | Stage::Lost => Advisory::terminal("Workflow complete."),
    }
}

/// Advisory for an untyped stage label, e.g. one read from an external record.
pub fn next_step_for(stage: &str, fein: &str) -> Result<Advisory, UnknownStageError> {
    let stage: Stage = stage.parse()?;
    Ok(next_step(stage, fein))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_points_to_industry() {
        let advisory = next_step(Stage::New, "12345678901");
        assert_eq!(advisory.message, "Provide a valid industry.");
        assert_eq!(advisory.action.as_deref(), Some("/business/12345678901/industry/"));
        assert_eq!(advisory.payload, Some(json!({"industry": "<name>"})));
        assert!(!advisory.is_terminal());
    }

    #[test]
    fn test_market_approved_points_to_contact() {
        let advisory = next_step(Stage::MarketApproved, "42");
        assert_eq!(advisory.action.as_deref(), Some("/business/42/contact/"));
        assert_eq!(
            advisory.payload,
            Some(json!({"contact": {"name": "<name>", "phone": "<11 digits>"}}))
        );
    }

    #[test]
    fn test_sales_approved_points_to_completion() {
        let advisory = next_step(Stage::SalesApproved, "42");
        assert_eq!(advisory.message, "Move to Won or Lost.");
        assert_eq!(advisory.action.as_deref(), Some("/business/42/complete_process/"));
        assert_eq!(advisory.payload, Some(json!({"stage": "Won|Lost"})));
    }

    #[test]
    fn test_terminal_stages_have_no_action() {
        assert_eq!(next_step(Stage::MarketDeclined, "42").message, "No further steps.");
        for stage in [Stage::MarketDeclined, Stage::Won, Stage::Lost] {
            assert!(next_step(stage, "42").is_terminal());
        }
        assert_eq!(next_step(Stage::Lost, "42").message, "Workflow complete.");
    }

    #[test]
    fn test_terminal_advisory_serializes_without_action() {
        let json = serde_json::to_value(next_step(Stage::Won, "42")).unwrap();
        assert_eq!(json, json!({"message": "Workflow complete."}));
    }

    #[test]
    fn test_unknown_stage_label() {
        assert_eq!(
            next_step_for("Pending", "42"),
            Err(UnknownStageError("Pending".to_string()))
        );
        assert!(next_step_for("Sales Approved", "42").is_ok());
    }
}
