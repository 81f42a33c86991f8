//! # API Facade
//!
//! The single entry point for all funnel operations, regardless of the UI
//! in front of it. The facade dispatches to the command layer, owns the
//! ambient clock (commands and the pure core take `now` as an argument so
//! they stay deterministic under test), and returns structured
//! `Result<CmdResult>` values — never strings, never terminal output.
//!
//! Generic over [`DataStore`] so the same code path runs against the
//! production `FileStore` and the in-memory test store.

use chrono::Utc;

use crate::commands;
use crate::config::FunnelConfig;
use crate::error::Result;
use crate::filter::{ContactFilter, OpportunityFilter};
use crate::forecast::Period;
use crate::store::DataStore;
use crate::validate::{ContactDraft, JobGradeDraft, OpportunityDraft};

pub struct FunnelApi<S: DataStore> {
    store: S,
    config: FunnelConfig,
}

impl<S: DataStore> FunnelApi<S> {
    pub fn new(store: S, config: FunnelConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FunnelConfig {
        &self.config
    }

    pub fn list_contacts(&self, filter: &ContactFilter, page: usize) -> Result<commands::CmdResult> {
        commands::list::run(&self.store, filter, page, self.config.page_size, Utc::now())
    }

    pub fn search_contacts(&self, term: &str) -> Result<commands::CmdResult> {
        commands::search::run(&self.store, term)
    }

    pub fn create_contact(
        &mut self,
        draft: &ContactDraft,
        tags: &[String],
    ) -> Result<commands::CmdResult> {
        commands::create::contact(&mut self.store, draft, tags)
    }

    pub fn update_contacts(
        &mut self,
        patches: &[commands::ContactPatch],
    ) -> Result<commands::CmdResult> {
        commands::update::contacts(&mut self.store, patches)
    }

    pub fn bulk_contacts(&mut self, action: &str, ids: &[String]) -> Result<commands::CmdResult> {
        commands::bulk::run(&mut self.store, action, ids)
    }

    pub fn restore_contacts(&mut self, ids: &[String]) -> Result<commands::CmdResult> {
        commands::restore::run(&mut self.store, ids)
    }

    pub fn list_deals(&self, filter: &OpportunityFilter, page: usize) -> Result<commands::CmdResult> {
        commands::deals::run(&self.store, filter, page, self.config.page_size, Utc::now())
    }

    pub fn create_deal(&mut self, draft: &OpportunityDraft) -> Result<commands::CmdResult> {
        commands::create::opportunity(&mut self.store, draft)
    }

    pub fn update_deals(
        &mut self,
        patches: &[commands::OpportunityPatch],
    ) -> Result<commands::CmdResult> {
        commands::update::opportunities(&mut self.store, patches)
    }

    pub fn remove_deals(&mut self, ids: &[String]) -> Result<commands::CmdResult> {
        commands::remove::run(&mut self.store, ids)
    }

    pub fn forecast(
        &self,
        filter: &OpportunityFilter,
        period: Option<Period>,
    ) -> Result<commands::CmdResult> {
        commands::forecast::run(&self.store, filter, period, Utc::now())
    }

    pub fn list_grades(
        &self,
        include_inactive: bool,
        search: &str,
        page: usize,
    ) -> Result<commands::CmdResult> {
        commands::grades::run(
            &self.store,
            include_inactive,
            search,
            page,
            self.config.page_size,
        )
    }

    pub fn create_grade(&mut self, draft: &JobGradeDraft) -> Result<commands::CmdResult> {
        commands::create::grade(&mut self.store, draft)
    }

    pub fn export(&self) -> Result<commands::CmdResult> {
        commands::export::run(&self.store)
    }
}
