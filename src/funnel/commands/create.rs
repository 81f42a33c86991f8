use std::collections::HashSet;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{normalize_tags, Contact, JobGrade, Opportunity};
use crate::store::DataStore;
use crate::validate::{
    validate_contact, validate_job_grade, validate_opportunity, ContactDraft, JobGradeDraft,
    OpportunityDraft,
};

/// Validates and stores a new contact. On validation failure nothing is
/// written and the field errors come back in the result.
pub fn contact<S: DataStore>(store: &mut S, draft: &ContactDraft, tags: &[String]) -> Result<CmdResult> {
    let errors = validate_contact(draft);
    if !errors.is_empty() {
        return Ok(CmdResult::default().with_field_errors(errors));
    }

    let mut record = Contact::new(draft.first_name.trim(), draft.last_name.trim());
    record.email = draft.email.trim().to_string();
    record.company = draft.company.trim().to_string();
    record.job_title = draft.job_title.trim().to_string();
    record.owner = draft.owner.trim().to_string();
    record.tags = normalize_tags(tags);
    store.save_contact(&record)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Contact created: {}",
        record.full_name()
    )));
    Ok(result.with_contacts(vec![record]))
}

pub fn opportunity<S: DataStore>(store: &mut S, draft: &OpportunityDraft) -> Result<CmdResult> {
    let errors = validate_opportunity(draft);
    if !errors.is_empty() {
        return Ok(CmdResult::default().with_field_errors(errors));
    }

    let mut record = Opportunity::new(draft.name.trim(), draft.amount, draft.probability);
    record.account = draft.account.trim().to_string();
    record.owner = draft.owner.trim().to_string();
    record.stage = draft.stage;
    record.lost_reason = draft.lost_reason.clone();
    store.save_opportunity(&record)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deal created: {} (weighted {:.0})",
        record.name,
        record.weighted_amount()
    )));
    Ok(result.with_opportunities(vec![record]))
}

pub fn grade<S: DataStore>(store: &mut S, draft: &JobGradeDraft) -> Result<CmdResult> {
    let existing: HashSet<String> = store
        .list_grades()?
        .into_iter()
        .map(|g| g.key)
        .collect();

    let errors = validate_job_grade(draft, &existing);
    if !errors.is_empty() {
        return Ok(CmdResult::default().with_field_errors(errors));
    }

    let mut record = JobGrade::new(draft.key.trim(), draft.title.trim());
    record.level = draft.level;
    record.min_salary = draft.min_salary;
    record.max_salary = draft.max_salary;
    store.save_grade(&record)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Job grade created: {} ({})",
        record.title, record.key
    )));
    Ok(result.with_grades(vec![record]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn contact_draft(first: &str, email: &str) -> ContactDraft {
        ContactDraft {
            first_name: first.into(),
            last_name: "Test".into(),
            email: email.into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_contact_is_persisted() {
        let mut store = InMemoryStore::new();
        let result = contact(&mut store, &contact_draft("Ada", "ada@x.io"), &[]).unwrap();
        assert!(!result.rejected());
        assert_eq!(store.list_contacts().unwrap().len(), 1);
    }

    #[test]
    fn invalid_contact_is_rejected_without_writing() {
        let mut store = InMemoryStore::new();
        let result = contact(&mut store, &contact_draft("", "bad-email"), &[]).unwrap();
        assert!(result.rejected());
        assert_eq!(result.field_errors.len(), 2);
        assert!(store.list_contacts().unwrap().is_empty());
    }

    #[test]
    fn tags_are_normalized_on_create() {
        let mut store = InMemoryStore::new();
        let tags = vec!["VIP".to_string(), "vip".to_string(), " beta ".to_string()];
        let result = contact(&mut store, &contact_draft("Ada", ""), &tags).unwrap();
        assert_eq!(result.contacts[0].tags, vec!["beta", "vip"]);
    }

    #[test]
    fn duplicate_grade_key_is_rejected() {
        let mut store = InMemoryStore::new();
        let draft = JobGradeDraft {
            key: "e2".into(),
            title: "Engineer II".into(),
            ..Default::default()
        };
        assert!(!grade(&mut store, &draft).unwrap().rejected());

        let dup = grade(&mut store, &draft).unwrap();
        assert!(dup.rejected());
        assert!(dup.field_errors["key"].contains("already in use"));
        assert_eq!(store.list_grades().unwrap().len(), 1);
    }

    #[test]
    fn opportunity_validation_gates_creation() {
        let mut store = InMemoryStore::new();
        let bad = OpportunityDraft {
            name: "".into(),
            amount: -5.0,
            ..Default::default()
        };
        let result = opportunity(&mut store, &bad).unwrap();
        assert!(result.rejected());
        assert!(store.list_opportunities().unwrap().is_empty());

        let good = OpportunityDraft {
            name: "Acme".into(),
            amount: 9_000.0,
            probability: 45,
            ..Default::default()
        };
        let result = opportunity(&mut store, &good).unwrap();
        assert!(!result.rejected());
        assert_eq!(result.opportunities[0].weighted_amount(), 4_050.0);
    }
}
