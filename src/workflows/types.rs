// Core types for the business onboarding state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::contact::Contact;
use super::errors::{UnknownStageError, WorkflowError};

/// Workflow stages a business moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stage {
    /// Created, waiting for an industry
    #[default]
    New,
    /// Industry accepted, waiting for a contact
    #[serde(rename = "Market Approved")]
    MarketApproved,
    /// Industry is valid but not served (terminal)
    #[serde(rename = "Market Declined")]
    MarketDeclined,
    /// Contact accepted, waiting for the sales outcome
    #[serde(rename = "Sales Approved")]
    SalesApproved,
    /// Terminal
    Won,
    /// Terminal
    Lost,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::New,
        Stage::MarketApproved,
        Stage::MarketDeclined,
        Stage::SalesApproved,
        Stage::Won,
        Stage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "New",
            Stage::MarketApproved => "Market Approved",
            Stage::MarketDeclined => "Market Declined",
            Stage::SalesApproved => "Sales Approved",
            Stage::Won => "Won",
            Stage::Lost => "Lost",
        }
    }

    /// No operation may move a business out of a terminal stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::MarketDeclined | Stage::Won | Stage::Lost)
    }

    /// Whether `finalize` accepts this stage as its target.
    pub fn is_final_outcome(&self) -> bool {
        matches!(self, Stage::Won | Stage::Lost)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStageError(s.to_string()))
    }
}

/// Industries a business may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    Restaurants,
    Stores,
    Wholesale,
    Services,
}

impl Industry {
    pub const ALL: [Industry; 4] = [
        Industry::Restaurants,
        Industry::Stores,
        Industry::Wholesale,
        Industry::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Restaurants => "restaurants",
            Industry::Stores => "stores",
            Industry::Wholesale => "wholesale",
            Industry::Services => "services",
        }
    }

    /// Accepted industries advance to Market Approved, the rest are declined.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Industry::Restaurants | Industry::Stores)
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Industry {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        Industry::ALL
            .into_iter()
            .find(|industry| industry.as_str() == normalized)
            .ok_or_else(|| WorkflowError::InvalidIndustry {
                industry: s.to_string(),
            })
    }
}

/// A business and its onboarding position.
///
/// The serialized form doubles as the storage snapshot:
/// `{name, fein, industry, contact: {name, phone}, stage}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub fein: String,
    pub industry: Option<Industry>,
    #[serde(default)]
    pub contact: Contact,
    pub stage: Stage,
}

impl Business {
    pub fn new(name: impl Into<String>, fein: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fein: fein.into(),
            industry: None,
            contact: Contact::default(),
            stage: Stage::New,
        }
    }
}

/// Events accepted by [`super::BusinessWorkflow::handle_event`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessEvent {
    SetIndustry { industry: String },
    SetContact { name: String, phone: String },
    Finalize { stage: Stage },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransitionRecord {
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub event: BusinessEvent,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels_round_trip_through_from_str() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_unknown_stage_is_rejected() {
        let err = "Closed".parse::<Stage>().unwrap_err();
        assert_eq!(err, UnknownStageError("Closed".to_string()));

        // Stage labels are matched exactly
        assert!("market approved".parse::<Stage>().is_err());
    }

    #[test]
    fn test_terminal_stages() {
        let terminal: Vec<Stage> = Stage::ALL.into_iter().filter(Stage::is_terminal).collect();
        assert_eq!(terminal, vec![Stage::MarketDeclined, Stage::Won, Stage::Lost]);
    }

    #[test]
    fn test_industry_parsing_is_case_insensitive() {
        assert_eq!("Restaurants".parse::<Industry>().unwrap(), Industry::Restaurants);
        assert_eq!("STORES".parse::<Industry>().unwrap(), Industry::Stores);
        assert_eq!("wholesale".parse::<Industry>().unwrap(), Industry::Wholesale);

        let err = "manufacturing".parse::<Industry>().unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidIndustry { .. }));
    }

    #[test]
    fn test_business_snapshot_shape() {
        let business = Business::new("Joe's", "12345678901");
        let json = serde_json::to_value(&business).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "Joe's",
                "fein": "12345678901",
                "industry": null,
                "contact": {"name": null, "phone": null},
                "stage": "New"
            })
        );
    }

    #[test]
    fn test_snapshot_with_unknown_stage_fails_to_deserialize() {
        let raw = r#"{"name":"Joe's","fein":"1","industry":null,
            "contact":{"name":null,"phone":null},"stage":"Archived"}"#;
        assert!(serde_json::from_str::<Business>(raw).is_err());
    }
}
