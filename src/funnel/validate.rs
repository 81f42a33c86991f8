//! Form validation.
//!
//! Each `validate_*` function takes a draft (the raw form data), checks it
//! against per-field and cross-field rules, and returns a field→message
//! map. An empty map means the draft is valid. Validation never mutates
//! its input, never errors, and holds no state; the uniqueness check takes
//! the comparison set from the caller.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::OpportunityStage;

/// Field name → human-readable message. Ordered so rendering is stable.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Raw contact form data, pre-validation.
#[derive(Debug, Clone, Default)]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company: String,
    pub job_title: String,
    pub owner: String,
}

/// Raw deal form data, pre-validation.
#[derive(Debug, Clone, Default)]
pub struct OpportunityDraft {
    pub name: String,
    pub account: String,
    pub owner: String,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub probability: u8,
    pub lost_reason: Option<String>,
}

/// Raw job-grade form data, pre-validation.
#[derive(Debug, Clone, Default)]
pub struct JobGradeDraft {
    pub key: String,
    pub title: String,
    pub level: u8,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), format!("{} is required", label));
    }
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if !value.trim().is_empty() && !EMAIL_RE.is_match(value.trim()) {
        errors.insert(
            "email".to_string(),
            "Enter a valid email address".to_string(),
        );
    }
}

pub fn validate_contact(draft: &ContactDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "first_name", &draft.first_name, "First name");
    require(&mut errors, "last_name", &draft.last_name, "Last name");
    check_email(&mut errors, &draft.email);
    errors
}

pub fn validate_opportunity(draft: &OpportunityDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", &draft.name, "Deal name");
    if draft.amount <= 0.0 {
        errors.insert(
            "amount".to_string(),
            "Amount must be greater than zero".to_string(),
        );
    }
    if draft.probability > 100 {
        errors.insert(
            "probability".to_string(),
            "Probability must be between 0 and 100".to_string(),
        );
    }
    // Cross-field rule: a lost deal has to say why.
    if draft.stage == OpportunityStage::ClosedLost {
        let reason = draft.lost_reason.as_deref().unwrap_or("");
        if reason.trim().is_empty() {
            errors.insert(
                "lost_reason".to_string(),
                "Lost reason is required when a deal is closed lost".to_string(),
            );
        }
    }
    errors
}

/// Validates a job grade against the keys already in use. The caller owns
/// the existing-keys set; pass the current collection's keys minus the
/// record being edited.
pub fn validate_job_grade(draft: &JobGradeDraft, existing_keys: &HashSet<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "key", &draft.key, "Grade key");
    require(&mut errors, "title", &draft.title, "Title");

    let key = draft.key.trim();
    if !key.is_empty() && existing_keys.contains(key) {
        errors.insert(
            "key".to_string(),
            format!("Grade key '{}' is already in use", key),
        );
    }

    if let (Some(min), Some(max)) = (draft.min_salary, draft.max_salary) {
        if min > max {
            errors.insert(
                "max_salary".to_string(),
                "Maximum salary must not be below the minimum".to_string(),
            );
        }
    }
    errors
}
