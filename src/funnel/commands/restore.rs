use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FunnelError, Result};
use crate::store::DataStore;

/// Re-activates archived contacts: the inverse of the archive bulk action.
/// Missing ids are skipped with a warning.
pub fn run<S: DataStore>(store: &mut S, ids: &[String]) -> Result<CmdResult> {
    if ids.is_empty() {
        return Err(FunnelError::Api("No contacts selected to restore".into()));
    }

    let mut result = CmdResult::default();
    for id in ids {
        let mut record = match store.get_contact(id) {
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

        record.is_active = true;
        record.touch();
        store.save_contact(&record)?;
        result.add_message(CmdMessage::success(format!(
            "Contact restored: {}",
            record.full_name()
        )));
        result.contacts.push(record);
    }

    Ok(result)
}
