use super::{upsert_by_id, DataStore};
use crate::error::{FunnelError, Result};
use crate::model::{Contact, JobGrade, Opportunity};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONTACTS_FILE: &str = "contacts.json";
const OPPORTUNITIES_FILE: &str = "opportunities.json";
const GRADES_FILE: &str = "grades.json";

/// JSON-file backed store. One array file per collection, rewritten
/// whole on every save; collection sizes here are tens to low hundreds,
/// so a full rewrite is the simple and sufficient choice.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(FunnelError::Io)?;
        }
        Ok(())
    }

    fn load_collection<T: DeserializeOwned>(&self, filename: &str) -> Result<Vec<T>> {
        let path = self.root.join(filename);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(FunnelError::Io)?;
        let records: Vec<T> = serde_json::from_str(&content).map_err(FunnelError::Serialization)?;
        Ok(records)
    }

    fn save_collection<T: Serialize>(&self, filename: &str, records: &[T]) -> Result<()> {
        self.ensure_root()?;
        let path = self.root.join(filename);
        let content = serde_json::to_string_pretty(records).map_err(FunnelError::Serialization)?;
        fs::write(path, content).map_err(FunnelError::Io)?;
        Ok(())
    }
}

impl DataStore for FileStore {
    fn save_contact(&mut self, contact: &Contact) -> Result<()> {
        let mut contacts: Vec<Contact> = self.load_collection(CONTACTS_FILE)?;
        upsert_by_id(&mut contacts, contact.clone(), |c| &c.id);
        self.save_collection(CONTACTS_FILE, &contacts)
    }

    fn get_contact(&self, id: &str) -> Result<Contact> {
        let contacts: Vec<Contact> = self.load_collection(CONTACTS_FILE)?;
        contacts
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| FunnelError::RecordNotFound(id.to_string()))
    }

    fn list_contacts(&self) -> Result<Vec<Contact>> {
        self.load_collection(CONTACTS_FILE)
    }

    fn save_opportunity(&mut self, opportunity: &Opportunity) -> Result<()> {
        let mut opportunities: Vec<Opportunity> = self.load_collection(OPPORTUNITIES_FILE)?;
        upsert_by_id(&mut opportunities, opportunity.clone(), |o| &o.id);
        self.save_collection(OPPORTUNITIES_FILE, &opportunities)
    }

    fn get_opportunity(&self, id: &str) -> Result<Opportunity> {
        let opportunities: Vec<Opportunity> = self.load_collection(OPPORTUNITIES_FILE)?;
        opportunities
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| FunnelError::RecordNotFound(id.to_string()))
    }

    fn list_opportunities(&self) -> Result<Vec<Opportunity>> {
        self.load_collection(OPPORTUNITIES_FILE)
    }

    fn remove_opportunity(&mut self, id: &str) -> Result<()> {
        let mut opportunities: Vec<Opportunity> = self.load_collection(OPPORTUNITIES_FILE)?;
        let before = opportunities.len();
        opportunities.retain(|o| o.id != id);
        if opportunities.len() == before {
            return Err(FunnelError::RecordNotFound(id.to_string()));
        }
        self.save_collection(OPPORTUNITIES_FILE, &opportunities)
    }

    fn save_grade(&mut self, grade: &JobGrade) -> Result<()> {
        let mut grades: Vec<JobGrade> = self.load_collection(GRADES_FILE)?;
        upsert_by_id(&mut grades, grade.clone(), |g| &g.id);
        self.save_collection(GRADES_FILE, &grades)
    }

    fn list_grades(&self) -> Result<Vec<JobGrade>> {
        self.load_collection(GRADES_FILE)
    }
}
