use crate::commands::CmdResult;
use crate::error::Result;
use crate::page::paginate;
use crate::store::DataStore;

/// Lists job grades, optionally including retired ones, with a free-text
/// match over key and title. Shares the paginator with the other lists.
pub fn run<S: DataStore>(
    store: &S,
    include_inactive: bool,
    search: &str,
    page: usize,
    page_size: usize,
) -> Result<CmdResult> {
    let term = search.trim().to_lowercase();
    let grades: Vec<_> = store
        .list_grades()?
        .into_iter()
        .filter(|g| include_inactive || g.is_active)
        .filter(|g| {
            term.is_empty()
                || g.key.to_lowercase().contains(&term)
                || g.title.to_lowercase().contains(&term)
        })
        .collect();

    let page = paginate(&grades, page_size, page);
    Ok(CmdResult::default()
        .with_page(page.meta())
        .with_grades(page.items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::DataStore;

    #[test]
    fn lists_active_grades_matching_search() {
        let fixture = StoreFixture::new()
            .with_grade("e1", "Engineer I")
            .with_grade("e2", "Engineer II")
            .with_grade("m1", "Manager I");

        let result = run(&fixture.store, false, "engineer", 1, 10).unwrap();
        assert_eq!(result.grades.len(), 2);
        assert_eq!(result.grades[0].key, "e1");
    }

    #[test]
    fn retired_grades_hidden_by_default() {
        let fixture = StoreFixture::new().with_grade("old", "Legacy Grade");
        let mut store = fixture.store;
        let mut grade = store.list_grades().unwrap()[0].clone();
        grade.is_active = false;
        store.save_grade(&grade).unwrap();

        assert!(run(&store, false, "", 1, 10).unwrap().grades.is_empty());
        assert_eq!(run(&store, true, "", 1, 10).unwrap().grades.len(), 1);
    }

    #[test]
    fn grades_share_the_paginator() {
        let mut fixture = StoreFixture::new();
        for i in 0..12 {
            fixture = fixture.with_grade(&format!("g{}", i), "Grade");
        }
        let result = run(&fixture.store, false, "", 2, 10).unwrap();
        assert_eq!(result.grades.len(), 2);
        assert_eq!(result.page.unwrap().total_pages, 2);
    }
}
