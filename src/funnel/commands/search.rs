use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Contact;
use crate::store::DataStore;

/// Ranked free-text search over active contacts.
///
/// Tiers: exact full-name match, then substring in a name part, then
/// substring in a secondary field (email, company, job title). Ties break
/// by shorter name, then older record.
pub fn run<S: DataStore>(store: &S, term: &str) -> Result<CmdResult> {
    let contacts = store.list_contacts()?;
    let term_lower = term.trim().to_lowercase();
    if term_lower.is_empty() {
        return Ok(CmdResult::default().with_contacts(
            contacts.into_iter().filter(|c| c.is_active).collect(),
        ));
    }

    let mut matches: Vec<(Contact, u8)> = contacts
        .into_iter()
        .filter(|c| c.is_active)
        .filter_map(|c| {
            let name_lower = c.full_name().to_lowercase();

            let score = if name_lower == term_lower {
                1
            } else if name_lower.contains(&term_lower) {
                2
            } else if [&c.email, &c.company, &c.job_title]
                .iter()
                .any(|f| f.to_lowercase().contains(&term_lower))
            {
                3
            } else {
                return None;
            };

            Some((c, score))
        })
        .collect();

    matches.sort_by(|(a, score_a), (b, score_b)| match score_a.cmp(score_b) {
        std::cmp::Ordering::Equal => {
            let len_a = a.full_name().len();
            let len_b = b.full_name().len();
            match len_a.cmp(&len_b) {
                std::cmp::Ordering::Equal => a.created_at.cmp(&b.created_at),
                ord => ord,
            }
        }
        ord => ord,
    });

    let listed = matches.into_iter().map(|(c, _)| c).collect();
    Ok(CmdResult::default().with_contacts(listed))
}
