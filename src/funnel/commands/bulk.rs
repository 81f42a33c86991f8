use chrono::Utc;

use crate::bulk::{apply_bulk, BulkAction};
use crate::commands::{export, CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

/// Runs a named bulk action against the contact collection.
///
/// Unknown action names are reported and ignored rather than failing the
/// whole request; a UI mid-flow should not blow up on a stale action
/// string. An empty id list is rejected (`Api` error) before anything runs.
pub fn run<S: DataStore>(store: &mut S, action_name: &str, target_ids: &[String]) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let action = match BulkAction::parse(action_name) {
        Some(action) => action,
        None => {
            result.add_message(CmdMessage::warning(format!(
                "Unknown bulk action '{}': nothing applied",
                action_name
            )));
            return Ok(result);
        }
    };

    let contacts = store.list_contacts()?;
    let updated = apply_bulk(&contacts, action, target_ids, Utc::now())?;

    // Report ids that matched nothing; the rest of the batch still applies.
    let mut hits = 0usize;
    for id in target_ids {
        if contacts.iter().any(|c| &c.id == id) {
            hits += 1;
        } else {
            result.add_message(CmdMessage::warning(format!(
                "No contact with id {}: skipped",
                id
            )));
        }
    }

    if action == BulkAction::Export {
        let targeted: Vec<_> = updated
            .iter()
            .filter(|c| target_ids.iter().any(|id| id == &c.id))
            .cloned()
            .collect();
        return export::contacts_snapshot(&targeted, result);
    }

    for record in &updated {
        if target_ids.iter().any(|id| id == &record.id) {
            store.save_contact(record)?;
        }
    }

    if hits > 0 {
        result.add_message(CmdMessage::success(format!(
            "Applied {} to {} contact(s)",
            action.describe(),
            hits
        )));
    }
    Ok(result.with_contacts(updated))
}
