use crate::commands::{CmdMessage, CmdResult, ContactPatch, OpportunityPatch};
use crate::error::{FunnelError, Result};
use crate::model::normalize_tags;
use crate::store::DataStore;
use crate::validate::FieldErrors;

/// Applies partial contact updates. Ids that no longer exist are skipped
/// with a warning; the rest of the batch still lands.
pub fn contacts<S: DataStore>(store: &mut S, patches: &[ContactPatch]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for patch in patches {
        let mut record = match store.get_contact(&patch.id) {
            Ok(record) => record,
            Err(FunnelError::RecordNotFound(id)) => {
                result.add_message(CmdMessage::warning(format!(
                    "No contact with id {}: skipped",
                    id
                )));
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(errors) = validate_patch_email(patch) {
            result.field_errors.extend(errors);
            result.add_message(CmdMessage::warning(format!(
                "Update for {} rejected by validation",
                record.full_name()
            )));
            continue;
        }

        if let Some(email) = &patch.email {
            record.email = email.trim().to_string();
        }
        if let Some(company) = &patch.company {
            record.company = company.trim().to_string();
        }
        if let Some(job_title) = &patch.job_title {
            record.job_title = job_title.trim().to_string();
        }
        if let Some(owner) = &patch.owner {
            record.owner = owner.trim().to_string();
        }
        if let Some(stage) = patch.stage {
            record.stage = stage;
        }
        if let Some(tags) = &patch.tags {
            record.tags = normalize_tags(tags);
        }
        record.touch();
        store.save_contact(&record)?;

        result.add_message(CmdMessage::success(format!(
            "Contact updated: {}",
            record.full_name()
        )));
        result.contacts.push(record);
    }

    Ok(result)
}

fn validate_patch_email(patch: &ContactPatch) -> Option<FieldErrors> {
    use crate::validate::{validate_contact, ContactDraft};

    let email = patch.email.as_deref()?;
    // Reuse the form rules with placeholder names so only email can fail.
    let probe = ContactDraft {
        first_name: "x".into(),
        last_name: "x".into(),
        email: email.into(),
        ..Default::default()
    };
    let errors = validate_contact(&probe);
    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

/// Applies partial opportunity updates with the same skip-on-missing
/// semantics. Numeric and cross-field rules run against the patched record
/// before it is written.
pub fn opportunities<S: DataStore>(
    store: &mut S,
    patches: &[OpportunityPatch],
) -> Result<CmdResult> {
    use crate::validate::{validate_opportunity, OpportunityDraft};

    let mut result = CmdResult::default();

    for patch in patches {
        let mut record = match store.get_opportunity(&patch.id) {
            Ok(record) => record,
            Err(FunnelError::RecordNotFound(id)) => {
                result.add_message(CmdMessage::warning(format!(
                    "No deal with id {}: skipped",
                    id
                )));
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(amount) = patch.amount {
            record.amount = amount;
        }
        if let Some(probability) = patch.probability {
            record.probability = probability;
        }
        if let Some(stage) = patch.stage {
            record.stage = stage;
        }
        if let Some(owner) = &patch.owner {
            record.owner = owner.trim().to_string();
        }
        if let Some(date) = patch.expected_close_date {
            record.expected_close_date = Some(date);
        }
        if let Some(reason) = &patch.lost_reason {
            record.lost_reason = Some(reason.clone());
        }

        let draft = OpportunityDraft {
            name: record.name.clone(),
            account: record.account.clone(),
            owner: record.owner.clone(),
            stage: record.stage,
            amount: record.amount,
            probability: record.probability,
            lost_reason: record.lost_reason.clone(),
        };
        let errors = validate_opportunity(&draft);
        if !errors.is_empty() {
            result.field_errors.extend(errors);
            result.add_message(CmdMessage::warning(format!(
                "Update for {} rejected by validation",
                record.name
            )));
            continue;
        }

        record.touch();
        store.save_opportunity(&record)?;
        result.add_message(CmdMessage::success(format!(
            "Deal updated: {} (weighted {:.0})",
            record.name,
            record.weighted_amount()
        )));
        result.opportunities.push(record);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContactStage, OpportunityStage};
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::DataStore;

    #[test]
    fn patch_merges_only_given_fields() {
        let fixture = StoreFixture::new().with_contact("Ada", "Lovelace", ContactStage::Lead);
        let mut store = fixture.store;
        let id = store.list_contacts().unwrap()[0].id.clone();

        let patch = ContactPatch {
            id: id.clone(),
            company: Some("Analytical Engines".into()),
            stage: Some(ContactStage::Customer),
            ..Default::default()
        };
        let result = contacts(&mut store, &[patch]).unwrap();
        assert_eq!(result.contacts.len(), 1);

        let updated = store.get_contact(&id).unwrap();
        assert_eq!(updated.company, "Analytical Engines");
        assert_eq!(updated.stage, ContactStage::Customer);
        assert_eq!(updated.first_name, "Ada");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn missing_ids_are_skipped_not_fatal() {
        let fixture = StoreFixture::new().with_contact("Ada", "Lovelace", ContactStage::Lead);
        let mut store = fixture.store;
        let real_id = store.list_contacts().unwrap()[0].id.clone();

        let patches = vec![
            ContactPatch {
                id: "id-404".into(),
                owner: Some("dana".into()),
                ..Default::default()
            },
            ContactPatch {
                id: real_id.clone(),
                owner: Some("dana".into()),
                ..Default::default()
            },
        ];
        let result = contacts(&mut store, &patches).unwrap();
        assert_eq!(result.contacts.len(), 1);
        assert!(matches!(
            result.messages[0].level,
            crate::commands::MessageLevel::Warning
        ));
        assert_eq!(store.get_contact(&real_id).unwrap().owner, "dana");
    }

    #[test]
    fn bad_email_patch_is_rejected() {
        let fixture = StoreFixture::new().with_contact("Ada", "Lovelace", ContactStage::Lead);
        let mut store = fixture.store;
        let id = store.list_contacts().unwrap()[0].id.clone();

        let patch = ContactPatch {
            id: id.clone(),
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        let result = contacts(&mut store, &[patch]).unwrap();
        assert!(result.rejected());
        assert_eq!(store.get_contact(&id).unwrap().email, "");
    }

    #[test]
    fn closing_a_deal_lost_needs_a_reason() {
        let fixture =
            StoreFixture::new().with_deal("Acme", 10_000.0, 60, OpportunityStage::Negotiation);
        let mut store = fixture.store;
        let id = store.list_opportunities().unwrap()[0].id.clone();

        let no_reason = OpportunityPatch {
            id: id.clone(),
            stage: Some(OpportunityStage::ClosedLost),
            ..Default::default()
        };
        let result = opportunities(&mut store, &[no_reason]).unwrap();
        assert!(result.rejected());
        assert_eq!(
            store.get_opportunity(&id).unwrap().stage,
            OpportunityStage::Negotiation
        );

        let with_reason = OpportunityPatch {
            id: id.clone(),
            stage: Some(OpportunityStage::ClosedLost),
            lost_reason: Some("Went with a competitor".into()),
            ..Default::default()
        };
        let result = opportunities(&mut store, &[with_reason]).unwrap();
        assert!(!result.rejected());
        assert_eq!(
            store.get_opportunity(&id).unwrap().stage,
            OpportunityStage::ClosedLost
        );
    }

    #[test]
    fn weighted_amount_tracks_patched_inputs() {
        let fixture =
            StoreFixture::new().with_deal("Acme", 100_000.0, 80, OpportunityStage::Proposal);
        let mut store = fixture.store;
        let id = store.list_opportunities().unwrap()[0].id.clone();

        let patch = OpportunityPatch {
            id: id.clone(),
            probability: Some(50),
            ..Default::default()
        };
        opportunities(&mut store, &[patch]).unwrap();
        assert_eq!(store.get_opportunity(&id).unwrap().weighted_amount(), 50_000.0);
    }
}
