use chrono::{DateTime, Utc};

use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::{filter_contacts, ContactFilter};
use crate::page::paginate;
use crate::store::DataStore;

pub fn run<S: DataStore>(
    store: &S,
    filter: &ContactFilter,
    page: usize,
    page_size: usize,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let contacts = store.list_contacts()?;
    let matched = filter_contacts(&contacts, filter, now);
    let page = paginate(&matched, page_size, page);

    Ok(CmdResult::default()
        .with_page(page.meta())
        .with_contacts(page.items))
}
