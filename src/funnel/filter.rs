//! Filter state and predicate evaluation.
//!
//! A filter struct captures the current user-chosen criteria for a list
//! view. Every dimension defaults to its neutral value (`Default` is the
//! match-everything state) and all active dimensions combine with AND.
//!
//! The evaluator never reads the system clock; callers pass `now` so that
//! date-window matching stays deterministic and testable.

use chrono::{DateTime, Months, NaiveTime, TimeDelta, Utc};

use crate::model::{Contact, ContactStage, Opportunity, OpportunityStage};

/// Relative creation-date window, interpreted against an injected `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    /// Since the start of the current calendar day.
    Today,
    /// The last seven days.
    Week,
    /// One calendar month back.
    Month,
    /// Three calendar months back.
    Quarter,
    #[default]
    All,
}

impl DateRange {
    /// Start of the `[lower_bound, +∞)` window, or `None` for no constraint.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateRange::Today => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            DateRange::Week => Some(now - TimeDelta::days(7)),
            DateRange::Month => Some(now.checked_sub_months(Months::new(1)).unwrap_or(now)),
            DateRange::Quarter => Some(now.checked_sub_months(Months::new(3)).unwrap_or(now)),
            DateRange::All => None,
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = crate::error::FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "quarter" => Ok(DateRange::Quarter),
            "all" => Ok(DateRange::All),
            other => Err(crate::error::FunnelError::Api(format!(
                "Unknown date range: {}",
                other
            ))),
        }
    }
}

/// Tri-state filter over the soft-delete flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl ActivityFilter {
    fn matches(&self, is_active: bool) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Active => is_active,
            ActivityFilter::Inactive => !is_active,
        }
    }
}

/// Current filter selections for the contact list.
///
/// `None` on a categorical dimension means "all" (no constraint); an empty
/// search term or tag list likewise matches everything.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub search_term: String,
    pub stage: Option<ContactStage>,
    pub company: Option<String>,
    pub owner: Option<String>,
    pub tags: Vec<String>,
    pub activity: ActivityFilter,
    pub created_within: DateRange,
}

impl ContactFilter {
    /// True iff every active dimension matches (conjunction).
    pub fn matches(&self, contact: &Contact, now: DateTime<Utc>) -> bool {
        text_matches(&self.search_term, &contact.searchable_fields())
            && self.stage.map_or(true, |s| contact.stage == s)
            && categorical_matches(self.company.as_deref(), &contact.company)
            && categorical_matches(self.owner.as_deref(), &contact.owner)
            && tags_intersect(&self.tags, &contact.tags)
            && self.activity.matches(contact.is_active)
            && created_within(self.created_within, contact.created_at, now)
    }
}

/// Current filter selections for the deal list.
#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub search_term: String,
    pub stage: Option<OpportunityStage>,
    pub owner: Option<String>,
    pub tags: Vec<String>,
    pub created_within: DateRange,
}

impl OpportunityFilter {
    pub fn matches(&self, opp: &Opportunity, now: DateTime<Utc>) -> bool {
        text_matches(&self.search_term, &opp.searchable_fields())
            && self.stage.map_or(true, |s| opp.stage == s)
            && categorical_matches(self.owner.as_deref(), &opp.owner)
            && tags_intersect(&self.tags, &opp.tags)
            && created_within(self.created_within, opp.created_at, now)
    }
}

/// Case-insensitive substring match across the record's searchable fields.
/// An empty term matches everything.
fn text_matches(term: &str, fields: &[&str]) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&term))
}

/// Exact, case-sensitive equality; `None` is the "all" sentinel.
fn categorical_matches(selected: Option<&str>, value: &str) -> bool {
    match selected {
        None => true,
        Some(wanted) => wanted == value,
    }
}

/// Match-ANY tag intersection. An empty filter set matches everything.
fn tags_intersect(filter_tags: &[String], record_tags: &[String]) -> bool {
    if filter_tags.is_empty() {
        return true;
    }
    filter_tags.iter().any(|t| record_tags.iter().any(|rt| rt == t))
}

fn created_within(range: DateRange, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match range.lower_bound(now) {
        None => true,
        Some(lower) => created_at >= lower,
    }
}

/// Applies the filter across a collection: pure, stable, order-preserving.
pub fn filter_contacts(
    contacts: &[Contact],
    filter: &ContactFilter,
    now: DateTime<Utc>,
) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| filter.matches(c, now))
        .cloned()
        .collect()
}

pub fn filter_opportunities(
    opportunities: &[Opportunity],
    filter: &OpportunityFilter,
    now: DateTime<Utc>,
) -> Vec<Opportunity> {
    opportunities
        .iter()
        .filter(|o| filter.matches(o, now))
        .cloned()
        .collect()
}
