//! Bulk mutation over a contact collection.
//!
//! The action vocabulary is a closed set parsed from its wire names:
//! `"archive"`, `"stage-<stage>"` and `"export"`. Unknown names parse to
//! `None`; callers decide how loudly to ignore them. The applier itself is
//! pure: it takes a collection and returns a new one, preserving order and
//! size. Target ids that do not exist are skipped, not errors.

use chrono::{DateTime, Utc};

use crate::error::{FunnelError, Result};
use crate::model::{Contact, ContactStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Soft-delete: flips `is_active` off and refreshes `updated_at`.
    Archive,
    /// Rewrites the stage of every targeted contact.
    SetStage(ContactStage),
    /// Side-channel marker; never transforms the collection.
    Export,
}

impl BulkAction {
    /// Parses a wire-vocabulary action name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "archive" => Some(BulkAction::Archive),
            "export" => Some(BulkAction::Export),
            _ => name
                .strip_prefix("stage-")
                .and_then(|stage| stage.parse().ok())
                .map(BulkAction::SetStage),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            BulkAction::Archive => "archive".to_string(),
            BulkAction::SetStage(stage) => format!("stage change to {}", stage),
            BulkAction::Export => "export".to_string(),
        }
    }
}

/// Applies `action` to every record whose id is in `target_ids`.
///
/// Returns a fresh collection with the same order and length. Archiving an
/// already-archived contact is harmless: the flag stays off, the audit
/// stamp still refreshes. An empty target list is rejected before anything
/// else is considered.
pub fn apply_bulk(
    records: &[Contact],
    action: BulkAction,
    target_ids: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<Contact>> {
    if target_ids.is_empty() {
        return Err(FunnelError::Api(
            "No contacts selected for bulk action".to_string(),
        ));
    }

    let transformed = records
        .iter()
        .map(|record| {
            if !target_ids.iter().any(|id| id == &record.id) {
                return record.clone();
            }
            let mut updated = record.clone();
            match action {
                BulkAction::Archive => {
                    updated.is_active = false;
                    updated.updated_at = now;
                }
                BulkAction::SetStage(stage) => {
                    updated.stage = stage;
                    updated.updated_at = now;
                }
                BulkAction::Export => {}
            }
            updated
        })
        .collect();

    Ok(transformed)
}
