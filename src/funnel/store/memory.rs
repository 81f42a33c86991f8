use super::{upsert_by_id, DataStore};
use crate::error::{FunnelError, Result};
use crate::model::{Contact, JobGrade, Opportunity};

/// In-memory storage for tests. No persistence.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    contacts: Vec<Contact>,
    opportunities: Vec<Opportunity>,
    grades: Vec<JobGrade>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn save_contact(&mut self, contact: &Contact) -> Result<()> {
        upsert_by_id(&mut self.contacts, contact.clone(), |c| &c.id);
        Ok(())
    }

    fn get_contact(&self, id: &str) -> Result<Contact> {
        self.contacts
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| FunnelError::RecordNotFound(id.to_string()))
    }

    fn list_contacts(&self) -> Result<Vec<Contact>> {
        Ok(self.contacts.clone())
    }

    fn save_opportunity(&mut self, opportunity: &Opportunity) -> Result<()> {
        upsert_by_id(&mut self.opportunities, opportunity.clone(), |o| &o.id);
        Ok(())
    }

    fn get_opportunity(&self, id: &str) -> Result<Opportunity> {
        self.opportunities
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| FunnelError::RecordNotFound(id.to_string()))
    }

    fn list_opportunities(&self) -> Result<Vec<Opportunity>> {
        Ok(self.opportunities.clone())
    }

    fn remove_opportunity(&mut self, id: &str) -> Result<()> {
        let before = self.opportunities.len();
        self.opportunities.retain(|o| o.id != id);
        if self.opportunities.len() == before {
            return Err(FunnelError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }

    fn save_grade(&mut self, grade: &JobGrade) -> Result<()> {
        upsert_by_id(&mut self.grades, grade.clone(), |g| &g.id);
        Ok(())
    }

    fn list_grades(&self) -> Result<Vec<JobGrade>> {
        Ok(self.grades.clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{ContactStage, OpportunityStage};

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_contacts(mut self, count: usize) -> Self {
            for i in 0..count {
                let contact = Contact::new(format!("Contact{}", i + 1), "Test");
                self.store.save_contact(&contact).unwrap();
            }
            self
        }

        pub fn with_contact(mut self, first: &str, last: &str, stage: ContactStage) -> Self {
            let mut contact = Contact::new(first, last);
            contact.stage = stage;
            self.store.save_contact(&contact).unwrap();
            self
        }

        pub fn with_archived_contact(mut self, first: &str, last: &str) -> Self {
            let mut contact = Contact::new(first, last);
            contact.is_active = false;
            self.store.save_contact(&contact).unwrap();
            self
        }

        pub fn with_deal(
            mut self,
            name: &str,
            amount: f64,
            probability: u8,
            stage: OpportunityStage,
        ) -> Self {
            let mut opp = Opportunity::new(name, amount, probability);
            opp.stage = stage;
            self.store.save_opportunity(&opp).unwrap();
            self
        }

        pub fn with_grade(mut self, key: &str, title: &str) -> Self {
            let grade = JobGrade::new(key, title);
            self.store.save_grade(&grade).unwrap();
            self
        }
    }
}
