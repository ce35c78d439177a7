//! Navigation-driven cursor transitions.
//!
//! Pagination is cursor-relative, not page-number-relative: `PageUp` and
//! `PageDown` key off the first/last row of the most recent successful page,
//! so a round trip lands relative to where the user actually was, stable
//! under concurrent inserts and updates upstream.

use jobdeck_commons::{Job, KeyScalar, PaginationCursor, SortField};

/// The four navigation intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Top,
    Bottom,
    PageUp,
    PageDown,
}

impl Navigation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Navigation::Top),
            "bottom" => Some(Navigation::Bottom),
            "up" => Some(Navigation::PageUp),
            "down" => Some(Navigation::PageDown),
            _ => None,
        }
    }
}

/// Extract a row's pagination key for the given primary sort column:
/// `[sortValue]`, plus the id tie-breaker when the column is not unique.
pub fn row_key(job: &Job, field: SortField) -> Vec<KeyScalar> {
    let mut key = vec![sort_value(job, field)];
    if !field.is_unique() {
        key.push(KeyScalar::Int(job.id.as_i64()));
    }
    key
}

fn sort_value(job: &Job, field: SortField) -> KeyScalar {
    match field {
        SortField::Id => KeyScalar::Int(job.id.as_i64()),
        SortField::Ctime => job.ctime.map(KeyScalar::Float).unwrap_or(KeyScalar::Null),
        SortField::Mtime => job.mtime.map(KeyScalar::Float).unwrap_or(KeyScalar::Null),
        SortField::Type => job
            .kind
            .clone()
            .map(KeyScalar::Text)
            .unwrap_or(KeyScalar::Null),
    }
}

/// Produce the next cursor for a navigation intent against the current
/// page. An empty page degrades `PageUp`/`PageDown` to `Top`/`Bottom`.
pub fn transition(nav: Navigation, page: &[Job], field: SortField) -> PaginationCursor {
    match nav {
        Navigation::Top => PaginationCursor::top(),
        Navigation::Bottom => PaginationCursor::bottom(),
        Navigation::PageUp => page
            .first()
            .map(|job| PaginationCursor::before(row_key(job, field)))
            .unwrap_or_else(PaginationCursor::top),
        Navigation::PageDown => page
            .last()
            .map(|job| PaginationCursor::after(row_key(job, field)))
            .unwrap_or_else(PaginationCursor::bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdeck_commons::JobId;

    fn job(id: i64, mtime: f64) -> Job {
        Job {
            id: JobId::new(id),
            ctime: None,
            mtime: Some(mtime),
            kind: None,
            queue: None,
            done: Some(1),
            sj_done: None,
            data: None,
            stump: None,
            project_id: None,
        }
    }

    #[test]
    fn id_sort_key_has_no_tie_breaker() {
        assert_eq!(
            row_key(&job(42, 1.0), SortField::Id),
            vec![KeyScalar::Int(42)]
        );
    }

    #[test]
    fn non_unique_sort_key_gets_id_tie_breaker() {
        assert_eq!(
            row_key(&job(42, 1.7e9), SortField::Mtime),
            vec![KeyScalar::Float(1.7e9), KeyScalar::Int(42)]
        );
    }

    #[test]
    fn missing_sort_value_keys_as_null() {
        let mut j = job(9, 0.0);
        j.mtime = None;
        assert_eq!(
            row_key(&j, SortField::Mtime),
            vec![KeyScalar::Null, KeyScalar::Int(9)]
        );
    }

    #[test]
    fn page_down_keys_off_last_row() {
        let page = vec![job(1, 10.0), job(2, 20.0)];
        let cursor = transition(Navigation::PageDown, &page, SortField::Mtime);
        assert_eq!(
            cursor.last_key,
            vec![KeyScalar::Float(20.0), KeyScalar::Int(2)]
        );
        assert!(cursor.forward_from_key);
    }

    #[test]
    fn page_up_keys_off_first_row() {
        let page = vec![job(1, 10.0), job(2, 20.0)];
        let cursor = transition(Navigation::PageUp, &page, SortField::Mtime);
        assert_eq!(
            cursor.last_key,
            vec![KeyScalar::Float(10.0), KeyScalar::Int(1)]
        );
        assert!(!cursor.forward_from_key);
    }

    #[test]
    fn empty_page_degrades_to_ends() {
        assert_eq!(
            transition(Navigation::PageUp, &[], SortField::Id),
            PaginationCursor::top()
        );
        assert_eq!(
            transition(Navigation::PageDown, &[], SortField::Id),
            PaginationCursor::bottom()
        );
    }
}
