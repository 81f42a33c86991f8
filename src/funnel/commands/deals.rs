use chrono::{DateTime, Utc};

use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::{filter_opportunities, OpportunityFilter};
use crate::page::paginate;
use crate::store::DataStore;

pub fn run<S: DataStore>(
    store: &S,
    filter: &OpportunityFilter,
    page: usize,
    page_size: usize,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let opportunities = store.list_opportunities()?;
    let matched = filter_opportunities(&opportunities, filter, now);
    let page = paginate(&matched, page_size, page);

    Ok(CmdResult::default()
        .with_page(page.meta())
        .with_opportunities(page.items))
}
