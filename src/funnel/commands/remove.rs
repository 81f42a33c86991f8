use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FunnelError, Result};
use crate::store::DataStore;

/// Hard-removes deals from the collection. Contacts never take this path;
/// they archive instead.
pub fn run<S: DataStore>(store: &mut S, ids: &[String]) -> Result<CmdResult> {
    if ids.is_empty() {
        return Err(FunnelError::Api("No deals selected to remove".into()));
    }

    let mut result = CmdResult::default();
    for id in ids {
        match store.remove_opportunity(id) {
            Ok(()) => {
                result.add_message(CmdMessage::success(format!("Deal removed: {}", id)));
            }
            Err(FunnelError::RecordNotFound(id)) => {
                result.add_message(CmdMessage::warning(format!(
                    "No deal with id {}: skipped",
                    id
                )));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OpportunityStage;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::DataStore;

    #[test]
    fn removes_the_targeted_deal_only() {
        let fixture = StoreFixture::new()
            .with_deal("Keep", 1_000.0, 50, OpportunityStage::Proposal)
            .with_deal("Drop", 2_000.0, 50, OpportunityStage::Proposal);
        let mut store = fixture.store;
        let drop_id = store.list_opportunities().unwrap()[1].id.clone();

        run(&mut store, &[drop_id]).unwrap();

        let remaining = store.list_opportunities().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Keep");
    }

    #[test]
    fn missing_deal_warns_and_continues() {
        let fixture = StoreFixture::new().with_deal("Keep", 1_000.0, 50, OpportunityStage::Proposal);
        let mut store = fixture.store;

        let result = run(&mut store, &["id-404".into()]).unwrap();
        assert!(matches!(
            result.messages[0].level,
            crate::commands::MessageLevel::Warning
        ));
        assert_eq!(store.list_opportunities().unwrap().len(), 1);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let mut store = StoreFixture::new().store;
        assert!(run(&mut store, &[]).is_err());
    }
}
