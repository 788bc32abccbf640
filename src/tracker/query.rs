//! List query parameters, filters, and page arithmetic.
//!
//! Raw parameters arrive as strings (exactly what a query string carries) in
//! [`ListParams`]. They are parsed into typed [`ProjectQuery`] / [`TaskQuery`]
//! values, collecting every invalid parameter into one [`ValidationErrors`].
//! Empty or whitespace-only values count as absent, so a client that sends
//! `status=` for "all statuses" imposes no constraint.

use crate::error::ValidationErrors;
use crate::tracker::models::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page number used when none is given.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Page size bounds applied while parsing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Page size when `per_page` is absent.
    pub default_per_page: u32,
    /// Largest accepted `per_page`.
    pub max_per_page: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default_per_page: DEFAULT_PER_PAGE, max_per_page: MAX_PER_PAGE }
    }
}

/// Unparsed list parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring to look for in the name/title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Task status filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Task project filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Items per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<String>,
}

impl ListParams {
    /// Parse into a project query.
    ///
    /// `status` and `project_id` are ignored for projects.
    ///
    /// # Errors
    ///
    /// Returns every invalid pagination parameter.
    pub fn into_project_query(
        self,
        limits: PageLimits,
    ) -> Result<ProjectQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let page = parse_page_request(&self, limits, &mut errors);
        let search = present(self.search);
        errors.into_result(ProjectQuery { search, page })
    }

    /// Parse into a task query.
    ///
    /// # Errors
    ///
    /// Returns every invalid parameter: pagination, `status` outside the
    /// enum, or a non-integer `project_id`.
    pub fn into_task_query(self, limits: PageLimits) -> Result<TaskQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let page = parse_page_request(&self, limits, &mut errors);

        let status = present(self.status).and_then(|raw| match Status::from_str(&raw) {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", "The selected status is invalid.");
                None
            }
        });

        let project_id = present(self.project_id).and_then(|raw| match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("project_id", "The project id must be an integer.");
                None
            }
        });

        let filter =
            TaskFilter { search: present(self.search), status, project_id, created_before: None };
        errors.into_result(TaskQuery { filter, page })
    }

    /// Key/value pairs for every present parameter, in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("search", &self.search),
            ("status", &self.status),
            ("project_id", &self.project_id),
            ("per_page", &self.per_page),
            ("page", &self.page),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value.as_deref().filter(|v| !v.trim().is_empty()).map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// Trim and drop empty values.
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_page_request(
    params: &ListParams,
    limits: PageLimits,
    errors: &mut ValidationErrors,
) -> PageRequest {
    let page = parse_positive(params.page.as_deref(), "page", errors).unwrap_or(DEFAULT_PAGE);
    let per_page = parse_positive(params.per_page.as_deref(), "per_page", errors)
        .unwrap_or(limits.default_per_page);
    if per_page > limits.max_per_page {
        errors.add(
            "per_page",
            format!("The per page must not be greater than {}.", limits.max_per_page),
        );
    }
    PageRequest { page, per_page: per_page.min(limits.max_per_page) }
}

fn parse_positive(raw: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Option<u32> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    let label = field.replace('_', " ");
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        Ok(_) => {
            errors.add(field, format!("The {label} must be at least 1."));
            None
        }
        Err(_) => {
            errors.add(field, format!("The {label} must be an integer."));
            None
        }
    }
}

/// A validated page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page, at least 1.
    pub per_page: u32,
}

impl PageRequest {
    /// Build a page request, clamping both values to at least 1.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page: page.max(1), per_page: per_page.max(1) }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, per_page: DEFAULT_PER_PAGE }
    }
}

/// Filters for listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectQuery {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Page position.
    pub page: PageRequest,
}

/// Predicates over tasks. Every present field narrows the result (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Exact status.
    pub status: Option<Status>,
    /// Exact owning project.
    pub project_id: Option<i64>,
    /// Strictly older than this instant.
    pub created_before: Option<DateTime<Utc>>,
}

/// Filters plus page position for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Predicates.
    pub filter: TaskFilter,
    /// Page position.
    pub page: PageRequest,
}

/// One page of results plus the metadata needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in id order.
    pub items: Vec<T>,
    /// The page that was requested.
    pub current_page: u32,
    /// The page size that was requested.
    pub per_page: u32,
    /// Number of matching rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page from a request and its results.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self { items, current_page: request.page, per_page: request.per_page, total }
    }

    /// Last page number: `ceil(total / per_page)`, and never less than 1.
    #[must_use]
    pub fn last_page(&self) -> u32 {
        last_page(self.total, self.per_page)
    }

    /// 1-based index of the first item on this page, if any.
    #[must_use]
    pub fn from(&self) -> Option<u64> {
        if self.items.is_empty() {
            None
        } else {
            Some(PageRequest::new(self.current_page, self.per_page).offset() + 1)
        }
    }

    /// 1-based index of the last item on this page, if any.
    #[must_use]
    pub fn to(&self) -> Option<u64> {
        self.from().map(|from| from + self.items.len() as u64 - 1)
    }

    /// Transform every item, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// `ceil(total / per_page)`, floored at 1 so an empty result still has a page.
#[must_use]
pub fn last_page(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Build a `LIKE` pattern matching `term` anywhere, with wildcards escaped.
///
/// Use with `ESCAPE '\'`.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "search" => params.search = value,
                "status" => params.status = value,
                "project_id" => params.project_id = value,
                "page" => params.page = value,
                "per_page" => params.per_page = value,
                other => panic!("unknown key {other}"),
            }
        }
        params
    }

    #[test]
    fn test_defaults_when_absent() {
        let query = ListParams::default().into_task_query(PageLimits::default()).unwrap();
        assert_eq!(query.page, PageRequest { page: 1, per_page: 10 });
        assert_eq!(query.filter, TaskFilter::default());
    }

    #[test]
    fn test_custom_default_per_page() {
        let limits = PageLimits { default_per_page: 25, max_per_page: 50 };
        let query = ListParams::default().into_project_query(limits).unwrap();
        assert_eq!(query.page.per_page, 25);
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let query = params(&[("status", ""), ("project_id", " "), ("search", ""), ("page", "")])
            .into_task_query(PageLimits::default())
            .unwrap();
        assert_eq!(query.filter, TaskFilter::default());
        assert_eq!(query.page.page, 1);
    }

    #[test]
    fn test_parses_all_task_filters() {
        let query = params(&[
            ("search", " homepage "),
            ("status", "pending"),
            ("project_id", "3"),
            ("page", "2"),
            ("per_page", "5"),
        ])
        .into_task_query(PageLimits::default())
        .unwrap();
        assert_eq!(query.filter.search.as_deref(), Some("homepage"));
        assert_eq!(query.filter.status, Some(Status::Pending));
        assert_eq!(query.filter.project_id, Some(3));
        assert_eq!(query.page, PageRequest { page: 2, per_page: 5 });
    }

    #[rstest]
    #[case("per_page", "0", "The per page must be at least 1.")]
    #[case("per_page", "-3", "The per page must be at least 1.")]
    #[case("per_page", "ten", "The per page must be an integer.")]
    #[case("per_page", "101", "The per page must not be greater than 100.")]
    #[case("page", "0", "The page must be at least 1.")]
    #[case("page", "x", "The page must be an integer.")]
    fn test_invalid_pagination(#[case] field: &str, #[case] value: &str, #[case] message: &str) {
        let errors =
            params(&[(field, value)]).into_project_query(PageLimits::default()).unwrap_err();
        assert_eq!(errors.messages(field), [message.to_string()]);
    }

    #[test]
    fn test_collects_every_invalid_task_parameter() {
        let errors = params(&[("status", "in_progress"), ("project_id", "abc"), ("page", "-1")])
            .into_task_query(PageLimits::default())
            .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["page", "project_id", "status"]);
    }

    #[test]
    fn test_to_pairs_skips_absent_and_empty() {
        let pairs = params(&[("search", "web"), ("status", ""), ("page", "2")]).to_pairs();
        assert_eq!(pairs, vec![("search", "web".to_string()), ("page", "2".to_string())]);
    }

    #[rstest]
    #[case(0, 10, 1)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 10, 3)]
    #[case(15, 5, 3)]
    #[case(9, 5, 2)]
    fn test_last_page(#[case] total: u64, #[case] per_page: u32, #[case] expected: u32) {
        assert_eq!(last_page(total, per_page), expected);
    }

    #[test]
    fn test_page_bounds() {
        let page = Page::new(vec!['a', 'b', 'c', 'd', 'e'], PageRequest::new(2, 5), 12);
        assert_eq!(page.from(), Some(6));
        assert_eq!(page.to(), Some(10));
        assert_eq!(page.last_page(), 3);

        let last = Page::new(vec!['k', 'l'], PageRequest::new(3, 5), 12);
        assert_eq!(last.from(), Some(11));
        assert_eq!(last.to(), Some(12));

        let beyond: Page<char> = Page::new(vec![], PageRequest::new(9, 5), 12);
        assert_eq!(beyond.from(), None);
        assert_eq!(beyond.to(), None);
        assert_eq!(beyond.total, 12);
        assert_eq!(beyond.last_page(), 3);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::new(1, 2), 4).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 4);
        assert_eq!(page.last_page(), 2);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("web"), "%web%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    proptest! {
        #[test]
        fn prop_last_page_is_ceiling(total in 1u64..10_000, per_page in 1u32..200) {
            let last = u64::from(last_page(total, per_page));
            prop_assert!(last * u64::from(per_page) >= total);
            prop_assert!((last - 1) * u64::from(per_page) < total);
        }
    }
}
