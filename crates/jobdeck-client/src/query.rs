//! Pure query construction.
//!
//! `build` maps `{selector, sort, cursor, options}` to a normalized
//! [`ListJobsRequest`]. It never mutates its inputs and always returns a new
//! immutable request, so replaying a build with the same state yields an
//! identical query (navigation stays idempotent).

use crate::wire::{ListJobsRequest, OrderSpec, SelectSpec, WireOptions};
use jobdeck_commons::{
    JobId, KeyScalar, PaginationCursor, ProjectId, Selector, SortField, SortSpec, UserId,
};

/// How far below a `NearId` target the cursor is seeded.
const NEAR_ID_OFFSET: i64 = 10;

/// Caller-tunable query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Include jobs not attached to any known project. Defaults to true,
    /// forced false when filtering by a specific project.
    pub include_unknown_projects: bool,
    /// Ask for full rows rather than the abbreviated summary columns.
    pub full: bool,
    /// Only jobs with (subjobs having) errors.
    pub error_only: bool,
    /// Page size cap, when the caller wants one.
    pub max_rows: Option<u32>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            include_unknown_projects: true,
            full: true,
            error_only: false,
            max_rows: None,
        }
    }
}

/// Filter criteria as they accumulate in session state.
///
/// Legacy session state could hold several criteria at once; the builder
/// resolves them with a fixed precedence, first match wins:
/// `ById > NearId > ByUser > ByProject > ByType > ByLogSubstring > None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorSet {
    pub id: Option<JobId>,
    pub near: Option<JobId>,
    pub user: Option<UserId>,
    pub project: Option<ProjectId>,
    pub kind: Option<String>,
    pub log: Option<String>,
}

impl SelectorSet {
    /// The single active selector under the precedence rule.
    pub fn effective(&self) -> Selector {
        if let Some(id) = self.id {
            Selector::ById(id)
        } else if let Some(near) = self.near {
            Selector::NearId(near)
        } else if let Some(user) = &self.user {
            Selector::ByUser(user.clone())
        } else if let Some(project) = &self.project {
            Selector::ByProject(project.clone())
        } else if let Some(kind) = &self.kind {
            Selector::ByType(kind.clone())
        } else if let Some(log) = &self.log {
            Selector::ByLogSubstring(log.clone())
        } else {
            Selector::None
        }
    }
}

impl From<Selector> for SelectorSet {
    fn from(selector: Selector) -> Self {
        let mut set = SelectorSet::default();
        match selector {
            Selector::None => {}
            Selector::ById(id) => set.id = Some(id),
            Selector::NearId(id) => set.near = Some(id),
            Selector::ByUser(user) => set.user = Some(user),
            Selector::ByProject(project) => set.project = Some(project),
            Selector::ByType(kind) => set.kind = Some(kind),
            Selector::ByLogSubstring(log) => set.log = Some(log),
        }
        set
    }
}

/// Build a `list_jobs` request for a summary listing.
///
/// Selector-driven overrides, in the order they matter:
/// - `ById` forces the sort column to `id` (a single job has one natural
///   position)
/// - `NearId(n)` forces ascending `id` order with the cursor seeded at
///   `n - 10`, overriding any caller-supplied cursor
/// - `ByProject` excludes unknown-project jobs
/// - `ByLogSubstring` gains wildcard markers on both ends (anywhere-match)
pub fn build(
    selectors: &SelectorSet,
    sort: SortSpec,
    cursor: &PaginationCursor,
    options: QueryOptions,
) -> ListJobsRequest {
    let mut sort = sort;
    let mut cursor = cursor.clone();
    let mut include_unknown = options.include_unknown_projects;

    let select = match selectors.effective() {
        Selector::ById(id) => {
            sort.field = SortField::Id;
            Some(SelectSpec::Job { job_id: id })
        }
        Selector::NearId(id) => {
            sort = SortSpec::ascending(SortField::Id);
            cursor = PaginationCursor::after(vec![KeyScalar::Int(id.as_i64() - NEAR_ID_OFFSET)]);
            None
        }
        Selector::ByUser(user) => Some(SelectSpec::User { user_id: user }),
        Selector::ByProject(project) => {
            include_unknown = false;
            Some(SelectSpec::Project {
                project_id: project,
            })
        }
        Selector::ByType(kind) => Some(SelectSpec::Type { kind }),
        Selector::ByLogSubstring(text) => Some(SelectSpec::Log {
            log: format!("*{}*", text),
        }),
        Selector::None => None,
    };

    ListJobsRequest {
        select,
        order: OrderSpec { sort, cursor },
        options: WireOptions {
            include_unknown_projects: include_unknown,
            full: options.full,
            error_only: options.error_only,
            max_rows: options.max_rows,
            include_subjobs: None,
        },
    }
}

/// Build the drill-down request: one stump job plus all its subjobs,
/// ordered by id ascending.
pub fn build_details(stump: JobId) -> ListJobsRequest {
    ListJobsRequest {
        select: Some(SelectSpec::Stump { stump }),
        order: OrderSpec {
            sort: SortSpec::ascending(SortField::Id),
            cursor: PaginationCursor::top(),
        },
        options: WireOptions {
            include_unknown_projects: true,
            full: true,
            error_only: false,
            max_rows: None,
            include_subjobs: Some(true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ById wins over a simultaneously-set project filter.
    #[test]
    fn selector_precedence_id_over_project() {
        let selectors = SelectorSet {
            id: Some(JobId::new(7)),
            project: Some(ProjectId::from("3")),
            ..Default::default()
        };
        let request = build(
            &selectors,
            SortSpec::default(),
            &PaginationCursor::top(),
            QueryOptions::default(),
        );
        assert_eq!(
            request.select,
            Some(SelectSpec::Job {
                job_id: JobId::new(7)
            })
        );
        assert_eq!(request.order.sort.field, SortField::Id);
        // The project filter was ignored entirely, so unknown-project jobs
        // stay included.
        assert!(request.options.include_unknown_projects);
    }

    /// NearId forces ascending id order seeded ten below the target,
    /// overriding the caller's cursor.
    #[test]
    fn near_id_seeds_cursor_below_target() {
        let selectors = SelectorSet::from(Selector::NearId(JobId::new(100)));
        let request = build(
            &selectors,
            SortSpec::new(SortField::Mtime, true),
            &PaginationCursor::before(vec![KeyScalar::Int(5)]),
            QueryOptions::default(),
        );
        assert_eq!(request.select, None);
        assert_eq!(request.order.sort.field, SortField::Id);
        assert!(!request.order.sort.descending);
        assert_eq!(request.order.cursor.last_key, vec![KeyScalar::Int(90)]);
        assert!(request.order.cursor.forward_from_key);
    }

    #[test]
    fn project_filter_excludes_unknown_projects() {
        let selectors = SelectorSet::from(Selector::ByProject(ProjectId::from("3")));
        let request = build(
            &selectors,
            SortSpec::default(),
            &PaginationCursor::top(),
            QueryOptions::default(),
        );
        assert!(!request.options.include_unknown_projects);
    }

    #[test]
    fn log_search_wraps_wildcards() {
        let selectors = SelectorSet::from(Selector::ByLogSubstring("timeout".to_string()));
        let request = build(
            &selectors,
            SortSpec::default(),
            &PaginationCursor::top(),
            QueryOptions::default(),
        );
        assert_eq!(
            request.select,
            Some(SelectSpec::Log {
                log: "*timeout*".to_string()
            })
        );
    }

    /// The builder copies its inputs; callers' cursor state is untouched.
    #[test]
    fn build_does_not_mutate_inputs() {
        let selectors = SelectorSet::from(Selector::NearId(JobId::new(50)));
        let cursor = PaginationCursor::before(vec![KeyScalar::Int(1)]);
        let _ = build(
            &selectors,
            SortSpec::default(),
            &cursor,
            QueryOptions::default(),
        );
        assert_eq!(cursor, PaginationCursor::before(vec![KeyScalar::Int(1)]));
    }

    #[test]
    fn details_request_selects_stump_with_subjobs() {
        let request = build_details(JobId::new(123));
        assert_eq!(
            request.select,
            Some(SelectSpec::Stump {
                stump: JobId::new(123)
            })
        );
        assert_eq!(request.options.include_subjobs, Some(true));
        assert_eq!(request.order.sort.field, SortField::Id);
        assert!(!request.order.sort.descending);
    }

    /// Wire key names are part of the protocol.
    #[test]
    fn request_serializes_expected_keys() {
        let selectors = SelectorSet::from(Selector::ByUser(UserId::new("u22")));
        let mut options = QueryOptions::default();
        options.max_rows = Some(25);
        let request = build(&selectors, SortSpec::default(), &PaginationCursor::top(), options);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["select"]["userID"], "u22");
        assert_eq!(json["order"]["sortBy"], "mtime");
        assert_eq!(json["order"]["sortDesc"], true);
        assert_eq!(json["options"]["includeUnknownProjects"], true);
        assert_eq!(json["options"]["full"], true);
        assert_eq!(json["options"]["errorOnly"], false);
        assert_eq!(json["options"]["maxRows"], 25);
        assert!(json["options"].get("includeSubjobs").is_none());
    }
}
