//! # Storage Layer
//!
//! The [`DataStore`] trait abstracts where record collections live so the
//! command layer can stay I/O-agnostic.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production JSON-file storage. Each collection is a
//!   single JSON **array** (`contacts.json`, `opportunities.json`,
//!   `grades.json`) so that insertion order — which list views and the
//!   stable filter rely on — survives a round trip.
//! - [`memory::InMemoryStore`]: in-memory storage for tests.
//!
//! ## Deletion policy at the storage boundary
//!
//! There is deliberately no `remove_contact`: contacts archive via
//! `save_contact` with `is_active = false`. Opportunities are the one
//! entity with a hard-removal path.

use crate::error::Result;
use crate::model::{Contact, JobGrade, Opportunity};

pub mod fs;
pub mod memory;

/// Abstract interface for record storage.
///
/// `save_*` upserts: an existing id is replaced in place (keeping its
/// position), a new id is appended. `list_*` returns records in stored
/// order.
pub trait DataStore {
    fn save_contact(&mut self, contact: &Contact) -> Result<()>;
    fn get_contact(&self, id: &str) -> Result<Contact>;
    fn list_contacts(&self) -> Result<Vec<Contact>>;

    fn save_opportunity(&mut self, opportunity: &Opportunity) -> Result<()>;
    fn get_opportunity(&self, id: &str) -> Result<Opportunity>;
    fn list_opportunities(&self) -> Result<Vec<Opportunity>>;
    /// Hard delete. Errors with `RecordNotFound` if the id is absent.
    fn remove_opportunity(&mut self, id: &str) -> Result<()>;

    fn save_grade(&mut self, grade: &JobGrade) -> Result<()>;
    fn list_grades(&self) -> Result<Vec<JobGrade>>;
}

/// Upsert into an ordered collection: replace in place or append.
pub(crate) fn upsert_by_id<T, F>(records: &mut Vec<T>, record: T, id_of: F)
where
    F: Fn(&T) -> &str,
{
    let id = id_of(&record).to_string();
    match records.iter().position(|r| id_of(r) == id) {
        Some(pos) => records[pos] = record,
        None => records.push(record),
    }
}
