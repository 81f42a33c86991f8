//! # Domain Model: Records, Stages and Derived Values
//!
//! This module defines the record types flowing through the engine:
//! [`Contact`], [`Opportunity`] and [`JobGrade`], plus the closed stage
//! enumerations that drive pipeline position.
//!
//! ## Derived values are methods, never fields
//!
//! An opportunity's weighted amount (`amount × probability / 100`) and its
//! forecast category are functions of the independent inputs. Storing them
//! would let them drift out of sync with `amount` and `probability` after an
//! edit, so they are exposed as [`Opportunity::weighted_amount`] and
//! [`Opportunity::forecast_category`] and recomputed on every read. Only the
//! inputs are serialized.
//!
//! ## Deletion policy
//!
//! - Contacts **soft-delete**: `is_active` flips to `false` and the record
//!   stays in the collection (restorable, keeps its audit trail).
//! - Opportunities **hard-delete**: removed from the collection entirely.
//!
//! ## Tags
//!
//! Tags are an unordered unique set, stored as a sorted, deduplicated,
//! lowercased `Vec<String>` (see [`normalize_tags`]). Filtering over tags is
//! match-ANY.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FunnelError;

/// Funnel position of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactStage {
    Lead,
    Prospect,
    Customer,
    Partner,
}

impl ContactStage {
    pub const ALL: [ContactStage; 4] = [
        ContactStage::Lead,
        ContactStage::Prospect,
        ContactStage::Customer,
        ContactStage::Partner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStage::Lead => "lead",
            ContactStage::Prospect => "prospect",
            ContactStage::Customer => "customer",
            ContactStage::Partner => "partner",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            ContactStage::Lead => "Lead",
            ContactStage::Prospect => "Prospect",
            ContactStage::Customer => "Customer",
            ContactStage::Partner => "Partner",
        }
    }
}

impl Default for ContactStage {
    fn default() -> Self {
        Self::Lead
    }
}

impl std::fmt::Display for ContactStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ContactStage {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lead" => Ok(ContactStage::Lead),
            "prospect" => Ok(ContactStage::Prospect),
            "customer" => Ok(ContactStage::Customer),
            "partner" => Ok(ContactStage::Partner),
            other => Err(FunnelError::Api(format!("Unknown contact stage: {}", other))),
        }
    }
}

/// Deal position of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpportunityStage {
    Qualification,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl OpportunityStage {
    pub const ALL: [OpportunityStage; 5] = [
        OpportunityStage::Qualification,
        OpportunityStage::Proposal,
        OpportunityStage::Negotiation,
        OpportunityStage::ClosedWon,
        OpportunityStage::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStage::Qualification => "qualification",
            OpportunityStage::Proposal => "proposal",
            OpportunityStage::Negotiation => "negotiation",
            OpportunityStage::ClosedWon => "closed-won",
            OpportunityStage::ClosedLost => "closed-lost",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpportunityStage::Qualification => "Qualification",
            OpportunityStage::Proposal => "Proposal",
            OpportunityStage::Negotiation => "Negotiation",
            OpportunityStage::ClosedWon => "Closed Won",
            OpportunityStage::ClosedLost => "Closed Lost",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            OpportunityStage::ClosedWon | OpportunityStage::ClosedLost
        )
    }
}

impl Default for OpportunityStage {
    fn default() -> Self {
        Self::Qualification
    }
}

impl std::fmt::Display for OpportunityStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OpportunityStage {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qualification" => Ok(OpportunityStage::Qualification),
            "proposal" => Ok(OpportunityStage::Proposal),
            "negotiation" => Ok(OpportunityStage::Negotiation),
            "closed-won" | "won" => Ok(OpportunityStage::ClosedWon),
            "closed-lost" | "lost" => Ok(OpportunityStage::ClosedLost),
            other => Err(FunnelError::Api(format!("Unknown deal stage: {}", other))),
        }
    }
}

/// Three-way revenue classification derived from probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastCategory {
    Commit,
    BestCase,
    Pipeline,
}

/// Probability at or above which a deal counts as committed.
pub const COMMIT_THRESHOLD: u8 = 70;
/// Probability at or above which a deal counts as best-case.
pub const BEST_CASE_THRESHOLD: u8 = 40;

impl ForecastCategory {
    pub fn from_probability(probability: u8) -> Self {
        if probability >= COMMIT_THRESHOLD {
            ForecastCategory::Commit
        } else if probability >= BEST_CASE_THRESHOLD {
            ForecastCategory::BestCase
        } else {
            ForecastCategory::Pipeline
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ForecastCategory::Commit => "Commit",
            ForecastCategory::BestCase => "Best Case",
            ForecastCategory::Pipeline => "Pipeline",
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

/// A person record in the CRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub stage: ContactStage,
    #[serde(default)]
    pub tags: Vec<String>,
    // Records written before soft-delete existed have no flag; they are live.
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: String::new(),
            company: String::new(),
            job_title: String::new(),
            owner: String::new(),
            stage: ContactStage::Lead,
            tags: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        name.trim().to_string()
    }

    /// The fields free-text search runs over, in match order.
    pub fn searchable_fields(&self) -> [&str; 5] {
        [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.company,
            &self.job_title,
        ]
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A deal record in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub stage: OpportunityStage,
    pub amount: f64,
    pub probability: u8,
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
    #[serde(default)]
    pub lost_reason: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn new(name: impl Into<String>, amount: f64, probability: u8) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            account: String::new(),
            owner: String::new(),
            stage: OpportunityStage::Qualification,
            amount,
            probability: probability.min(100),
            expected_close_date: None,
            lost_reason: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// `amount × probability / 100`, recomputed on every read.
    pub fn weighted_amount(&self) -> f64 {
        self.amount * f64::from(self.probability.min(100)) / 100.0
    }

    pub fn forecast_category(&self) -> ForecastCategory {
        ForecastCategory::from_probability(self.probability)
    }

    pub fn searchable_fields(&self) -> [&str; 3] {
        [&self.name, &self.account, &self.owner]
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// An HR job grade with a unique key within its collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobGrade {
    pub id: String,
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub max_salary: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobGrade {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            key: key.into(),
            title: title.into(),
            level: 0,
            min_salary: None,
            max_salary: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonicalizes a tag list: trim, lowercase, drop empties, sort, dedup.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = tags
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_amount_recomputes_from_inputs() {
        let mut opp = Opportunity::new("Acme renewal", 100_000.0, 80);
        assert_eq!(opp.weighted_amount(), 80_000.0);

        opp.probability = 50;
        assert_eq!(opp.weighted_amount(), 50_000.0);

        opp.amount = 10_000.0;
        assert_eq!(opp.weighted_amount(), 5_000.0);
    }

    #[test]
    fn weighted_amount_caps_overlarge_probability() {
        let mut opp = Opportunity::new("Bad data", 1_000.0, 100);
        // Deserialized records may carry out-of-range values.
        opp.probability = 250;
        assert_eq!(opp.weighted_amount(), 1_000.0);
    }

    #[test]
    fn forecast_category_thresholds() {
        assert_eq!(
            ForecastCategory::from_probability(70),
            ForecastCategory::Commit
        );
        assert_eq!(
            ForecastCategory::from_probability(100),
            ForecastCategory::Commit
        );
        assert_eq!(
            ForecastCategory::from_probability(69),
            ForecastCategory::BestCase
        );
        assert_eq!(
            ForecastCategory::from_probability(40),
            ForecastCategory::BestCase
        );
        assert_eq!(
            ForecastCategory::from_probability(39),
            ForecastCategory::Pipeline
        );
        assert_eq!(
            ForecastCategory::from_probability(0),
            ForecastCategory::Pipeline
        );
    }

    #[test]
    fn contact_full_name_trims_missing_parts() {
        let c = Contact::new("Ada", "Lovelace");
        assert_eq!(c.full_name(), "Ada Lovelace");

        let solo = Contact::new("Cher", "");
        assert_eq!(solo.full_name(), "Cher");
    }

    #[test]
    fn stage_parse_roundtrip() {
        for stage in ContactStage::ALL {
            let parsed: ContactStage = stage.as_str().parse().unwrap();
            assert_eq!(parsed, stage);
        }
        for stage in OpportunityStage::ALL {
            let parsed: OpportunityStage = stage.as_str().parse().unwrap();
            assert_eq!(parsed, stage);
        }
        assert!("mystery".parse::<ContactStage>().is_err());
    }

    #[test]
    fn stage_parse_is_case_insensitive() {
        assert_eq!("Lead".parse::<ContactStage>().unwrap(), ContactStage::Lead);
        assert_eq!(
            "Closed-Won".parse::<OpportunityStage>().unwrap(),
            OpportunityStage::ClosedWon
        );
    }

    #[test]
    fn normalize_tags_sorts_dedups_and_lowercases() {
        let tags = normalize_tags(["VIP", "  enterprise ", "vip", "", "beta"]);
        assert_eq!(tags, vec!["beta", "enterprise", "vip"]);
    }

    #[test]
    fn legacy_contact_without_active_flag_is_live() {
        let json = r#"{
            "id": "c-1",
            "first_name": "Grace",
            "last_name": "Hopper",
            "stage": "customer",
            "created_at": "2023-01-01T00:00:00Z",
            "updated_at": "2023-01-01T00:00:00Z"
        }"#;

        let loaded: Contact = serde_json::from_str(json).unwrap();
        assert!(loaded.is_active);
        assert_eq!(loaded.stage, ContactStage::Customer);
        assert!(loaded.tags.is_empty());
        assert_eq!(loaded.email, "");
    }

    #[test]
    fn opportunity_serialization_roundtrip() {
        let mut opp = Opportunity::new("Initech expansion", 25_000.0, 40);
        opp.stage = OpportunityStage::Proposal;
        opp.expected_close_date = NaiveDate::from_ymd_opt(2026, 9, 30);
        opp.tags = normalize_tags(["expansion"]);

        let json = serde_json::to_string(&opp).unwrap();
        // Derived values must not be persisted.
        assert!(!json.contains("weighted_amount"));
        assert!(!json.contains("forecast_category"));

        let loaded: Opportunity = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.id, opp.id);
        assert_eq!(loaded.stage, OpportunityStage::Proposal);
        assert_eq!(loaded.weighted_amount(), 10_000.0);
    }
}
