use chrono::NaiveDate;

use crate::forecast::{OwnerSummary, PipelineSummary};
use crate::model::{Contact, JobGrade, Opportunity, ContactStage, OpportunityStage};
use crate::page::PageMeta;
use crate::validate::FieldErrors;

pub mod bulk;
pub mod create;
pub mod deals;
pub mod export;
pub mod forecast;
pub mod grades;
pub mod list;
pub mod remove;
pub mod restore;
pub mod search;
pub mod update;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Structured result of a command: record payloads for list-like commands,
/// aggregates for the forecast, a field-error map when a form was rejected,
/// and messages for the UI to render at its own level of ceremony.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub contacts: Vec<Contact>,
    pub opportunities: Vec<Opportunity>,
    pub grades: Vec<JobGrade>,
    pub page: Option<PageMeta>,
    pub summary: Option<PipelineSummary>,
    pub owners: Vec<OwnerSummary>,
    pub field_errors: FieldErrors,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn with_opportunities(mut self, opportunities: Vec<Opportunity>) -> Self {
        self.opportunities = opportunities;
        self
    }

    pub fn with_grades(mut self, grades: Vec<JobGrade>) -> Self {
        self.grades = grades;
        self
    }

    pub fn with_page(mut self, page: PageMeta) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_summary(mut self, summary: PipelineSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_owners(mut self, owners: Vec<OwnerSummary>) -> Self {
        self.owners = owners;
        self
    }

    pub fn with_field_errors(mut self, errors: FieldErrors) -> Self {
        self.field_errors = errors;
        self
    }

    /// True when a form command was rejected by validation.
    pub fn rejected(&self) -> bool {
        !self.field_errors.is_empty()
    }
}

/// Partial update for a contact; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub id: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub owner: Option<String>,
    pub stage: Option<ContactStage>,
    pub tags: Option<Vec<String>>,
}

/// Partial update for an opportunity; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct OpportunityPatch {
    pub id: String,
    pub amount: Option<f64>,
    pub probability: Option<u8>,
    pub stage: Option<OpportunityStage>,
    pub owner: Option<String>,
    pub expected_close_date: Option<NaiveDate>,
    pub lost_reason: Option<String>,
}
