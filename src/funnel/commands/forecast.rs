use chrono::{DateTime, Utc};

use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::{filter_opportunities, OpportunityFilter};
use crate::forecast::{closing_in_period, group_by_owner, summarize, Period};
use crate::store::DataStore;

/// Computes the dashboard snapshot for the filtered deal set: the pipeline
/// summary, the per-owner leaderboard, and — when a period is given — the
/// deals expected to close inside it.
pub fn run<S: DataStore>(
    store: &S,
    filter: &OpportunityFilter,
    period: Option<Period>,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let opportunities = store.list_opportunities()?;
    let matched = filter_opportunities(&opportunities, filter, now);

    let summary = summarize(&matched);
    let owners = group_by_owner(&matched);
    let listed = match period {
        Some(period) => closing_in_period(&matched, period, now.date_naive()),
        None => matched,
    };

    Ok(CmdResult::default()
        .with_summary(summary)
        .with_owners(owners)
        .with_opportunities(listed))
}
