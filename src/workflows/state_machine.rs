// Business onboarding state machine
// Terminal stages are final; each gate checks another field's validity.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::contact::Contact;
use super::errors::WorkflowError;
use super::types::{Business, BusinessEvent, Industry, Stage, StateTransitionRecord};

/// What happens to the stored contact when a contact update is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPolicy {
    /// A rejected update leaves the previous contact untouched.
    #[default]
    Reject,
    /// The new contact is stored before the phone check, so a rejected
    /// update still overwrites the previous contact. Stage never advances.
    AssignBeforeValidate,
}

#[derive(Debug, Clone)]
pub struct BusinessWorkflow {
    business: Business,
    contact_policy: ContactPolicy,
    history: Vec<StateTransitionRecord>,
}

impl BusinessWorkflow {
    pub fn new(name: impl Into<String>, fein: impl Into<String>) -> Self {
        Self::from_snapshot(Business::new(name, fein))
    }

    /// Resume a workflow from a stored snapshot
    pub fn from_snapshot(business: Business) -> Self {
        Self {
            business,
            contact_policy: ContactPolicy::default(),
            history: Vec::new(),
        }
    }

    pub fn with_contact_policy(mut self, policy: ContactPolicy) -> Self {
        self.contact_policy = policy;
        self
    }

    pub fn stage(&self) -> Stage {
        self.business.stage
    }

    pub fn fein(&self) -> &str {
        &self.business.fein
    }

    pub fn snapshot(&self) -> &Business {
        &self.business
    }

    pub fn into_snapshot(self) -> Business {
        self.business
    }

    pub fn history(&self) -> &[StateTransitionRecord] {
        &self.history
    }

    pub fn is_complete(&self) -> bool {
        self.business.stage.is_terminal()
    }

    /// Dispatch an event to the matching transition and return the resulting stage.
    pub fn handle_event(&mut self, event: BusinessEvent) -> Result<Stage, WorkflowError> {
        match event {
            BusinessEvent::SetIndustry { industry } => self.set_industry(&industry),
            BusinessEvent::SetContact { name, phone } => self.set_contact(name, phone),
            BusinessEvent::Finalize { stage } => self.finalize(stage),
        }
    }

    /// Declare the industry. Accepted industries move to Market Approved,
    /// the remaining valid ones to Market Declined.
    pub fn set_industry(&mut self, industry: &str) -> Result<Stage, WorkflowError> {
        if self.business.stage.is_terminal() {
            return Err(self.reject(WorkflowError::WorkflowComplete {
                stage: self.business.stage,
            }));
        }

        let industry: Industry = industry.parse().map_err(|e| self.reject(e))?;

        self.business.industry = Some(industry);
        let next = if industry.is_accepted() {
            Stage::MarketApproved
        } else {
            Stage::MarketDeclined
        };

        self.transition(
            next,
            BusinessEvent::SetIndustry {
                industry: industry.as_str().to_string(),
            },
        );
        Ok(next)
    }

    /// Replace the contact. Only advances the stage from Market Approved;
    /// in any other stage the contact is updated and the stage kept.
    pub fn set_contact(
        &mut self,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Stage, WorkflowError> {
        let contact = Contact::new(name, phone);

        if !contact.verify_number() {
            let phone = contact.phone.clone().unwrap_or_default();
            if self.contact_policy == ContactPolicy::AssignBeforeValidate {
                self.business.contact = contact;
            }
            return Err(self.reject(WorkflowError::InvalidPhone { phone }));
        }

        let event = BusinessEvent::SetContact {
            name: contact.name.clone().unwrap_or_default(),
            phone: contact.phone.clone().unwrap_or_default(),
        };
        self.business.contact = contact;

        if self.business.stage == Stage::MarketApproved {
            self.transition(Stage::SalesApproved, event);
        } else {
            info!(
                fein = %self.business.fein,
                stage = %self.business.stage,
                "Contact updated without stage change"
            );
        }
        Ok(self.business.stage)
    }

    /// Close a Sales Approved workflow as Won or Lost.
    pub fn finalize(&mut self, target: Stage) -> Result<Stage, WorkflowError> {
        let current = self.business.stage;
        if current.is_final_outcome() {
            return Err(self.reject(WorkflowError::WorkflowComplete { stage: current }));
        }
        if !target.is_final_outcome() {
            return Err(self.reject(WorkflowError::InvalidFinalStage { stage: target }));
        }
        if current != Stage::SalesApproved {
            return Err(self.reject(WorkflowError::OnlyFromSalesApproved { stage: current }));
        }

        self.transition(target, BusinessEvent::Finalize { stage: target });
        Ok(target)
    }

    fn transition(&mut self, to: Stage, event: BusinessEvent) {
        let record = StateTransitionRecord {
            from_stage: self.business.stage,
            to_stage: to,
            event,
            timestamp: Utc::now(),
        };

        info!(
            fein = %self.business.fein,
            from_stage = %record.from_stage,
            to_stage = %record.to_stage,
            event = ?record.event,
            "Business workflow state transition"
        );

        self.business.stage = to;
        self.history.push(record);
    }

    fn reject(&self, error: WorkflowError) -> WorkflowError {
        warn!(
            fein = %self.business.fein,
            stage = %self.business.stage,
            code = error.code(),
            error = %error,
            "Business workflow transition rejected"
        );
        error
    }
}
