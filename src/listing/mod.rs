//! Shared list-query pipeline: lenient query-string parsing, allow-listed
//! sorting, pagination math and the paginated response envelope.
//!
//! Every admin/public list endpoint funnels through this module. Filter values
//! that fail to parse never error a request; they mean "no filter on this
//! field". The one special case is `isArchived`: when the parameter is absent
//! the archived rows are excluded, so admin lists hide archived records unless
//! asked for them explicitly.

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Fallback sort key when the requested one is absent or not allow-listed.
pub const DEFAULT_SORT: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: i64,
    pub limit: i64,
    pub sort_by: Option<String>,
    pub order: SortOrder,
    pub search: Option<String>,
}

impl ListParams {
    /// Builds params from raw query-string values, tolerating garbage:
    /// unparseable page/limit fall back to defaults, limit is clamped.
    pub fn from_raw(
        page: Option<&str>,
        limit: Option<&str>,
        sort_by: Option<&str>,
        order: Option<&str>,
        search: Option<&str>,
    ) -> Self {
        let page = page
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Self {
            page,
            limit,
            sort_by: sort_by.map(str::to_string),
            order: SortOrder::parse(order),
            search: search.and_then(|s| {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }),
        }
    }

    /// Saturates rather than overflowing, so an absurd page number yields an
    /// empty page instead of a failed request.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Resolves the sort against an entity's allow-list. A key that is
    /// present but not allow-listed falls back to the fixed default
    /// (creation timestamp, descending) so malformed input never breaks a
    /// list view; an absent key keeps the requested direction.
    pub fn sort<'a>(&'a self, allowed: &[&'a str]) -> (&'a str, SortOrder) {
        match self.sort_by.as_deref() {
            Some(key) if allowed.contains(&key) => (key, self.order),
            Some(_) => (DEFAULT_SORT, SortOrder::Desc),
            None => (DEFAULT_SORT, self.order),
        }
    }
}

/// Exact-match filter value: absent, blank and the "all" sentinel all mean
/// "do not filter on this field".
pub fn exact(raw: &Option<String>) -> Option<String> {
    raw.as_deref().and_then(|v| {
        let v = v.trim();
        if v.is_empty() || v.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(v.to_string())
        }
    })
}

/// Substring filter value as a case-insensitive ILIKE pattern.
pub fn pattern(raw: &Option<String>) -> Option<String> {
    raw.as_deref().and_then(|v| {
        let v = v.trim();
        (!v.is_empty()).then(|| like_pattern(v))
    })
}

pub fn like_pattern(needle: &str) -> String {
    format!("%{needle}%")
}

/// Boolean filter: applied only when explicitly "true"/"false"; anything
/// else is ignored.
pub fn flag(raw: &Option<String>) -> Option<bool> {
    match raw.as_deref().map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// The archived-visibility rule: omitted means "hide archived".
pub fn archived(raw: &Option<String>) -> bool {
    flag(raw).unwrap_or(false)
}

/// Boolean SQL fragment matching any element of a text-array column
/// case-insensitively. `$col` must be a column name literal.
#[macro_export]
macro_rules! array_ilike {
    ($col:literal, $pattern:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(concat!(
            "EXISTS (SELECT 1 FROM unnest(",
            $col,
            ") AS elem WHERE elem ILIKE "
        ))
        .bind::<diesel::sql_types::Text, _>($pattern)
        .sql(")")
    };
}

/// Applies asc/desc to a boxed query for one column.
#[macro_export]
macro_rules! order_by {
    ($query:expr, $order:expr, $col:expr) => {
        match $order {
            $crate::listing::SortOrder::Asc => $query.order($col.asc()),
            $crate::listing::SortOrder::Desc => $query.order($col.desc()),
        }
    };
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            success: true,
            data,
            pagination: Pagination {
                total,
                page: params.page,
                limit: params.limit,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_params_absent() {
        let p = ListParams::from_raw(None, None, None, None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.order, SortOrder::Desc);
        assert!(p.search.is_none());
    }

    #[test]
    fn garbage_page_and_limit_fall_back() {
        let p = ListParams::from_raw(Some("abc"), Some("-5"), None, Some("sideways"), None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert_eq!(p.order, SortOrder::Desc);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let p = ListParams::from_raw(Some("9223372036854775807"), Some("100"), None, None, None);
        assert_eq!(p.page, i64::MAX);
        assert_eq!(p.offset(), i64::MAX);

        // One past the last representable page still yields a valid window.
        let p = ListParams::from_raw(Some("92233720368547758"), Some("100"), None, None, None);
        assert!(p.offset() >= 0);
    }

    #[test]
    fn limit_is_clamped() {
        let p = ListParams::from_raw(Some("3"), Some("5000"), None, None, None);
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.offset(), 2 * MAX_LIMIT);
    }

    #[test]
    fn pagination_window() {
        let p = ListParams::from_raw(Some("4"), Some("25"), None, Some("asc"), None);
        assert_eq!(p.offset(), 75);
        assert_eq!(p.limit, 25);
        assert_eq!(p.order, SortOrder::Asc);
    }

    #[test]
    fn sort_respects_allow_list() {
        let allowed = &["name", "price", "createdAt"];
        let p = ListParams::from_raw(None, None, Some("price"), Some("asc"), None);
        assert_eq!(p.sort(allowed), ("price", SortOrder::Asc));

        // Unrecognized keys fall back to the full default, direction included.
        let p = ListParams::from_raw(None, None, Some("password"), Some("asc"), None);
        assert_eq!(p.sort(allowed), (DEFAULT_SORT, SortOrder::Desc));

        // Absent key keeps the requested direction.
        let p = ListParams::from_raw(None, None, None, Some("asc"), None);
        assert_eq!(p.sort(allowed), (DEFAULT_SORT, SortOrder::Asc));

        let p = ListParams::from_raw(None, None, None, None, None);
        assert_eq!(p.sort(allowed), (DEFAULT_SORT, SortOrder::Desc));
    }

    #[test]
    fn exact_ignores_blank_and_all_sentinel() {
        assert_eq!(exact(&None), None);
        assert_eq!(exact(&Some("".into())), None);
        assert_eq!(exact(&Some("  ".into())), None);
        assert_eq!(exact(&Some("all".into())), None);
        assert_eq!(exact(&Some("All".into())), None);
        assert_eq!(exact(&Some("cowhide".into())), Some("cowhide".into()));
    }

    #[test]
    fn pattern_wraps_in_wildcards() {
        assert_eq!(pattern(&Some("vachetta".into())), Some("%vachetta%".into()));
        assert_eq!(pattern(&Some("  ".into())), None);
    }

    #[test]
    fn flag_only_accepts_explicit_booleans() {
        assert_eq!(flag(&Some("true".into())), Some(true));
        assert_eq!(flag(&Some("false".into())), Some(false));
        assert_eq!(flag(&Some("yes".into())), None);
        assert_eq!(flag(&None), None);
    }

    #[test]
    fn archived_defaults_to_hidden() {
        assert!(!archived(&None));
        assert!(!archived(&Some("false".into())));
        assert!(archived(&Some("true".into())));
        // Garbage behaves like omitted.
        assert!(!archived(&Some("maybe".into())));
    }

    #[test]
    fn search_is_trimmed() {
        let p = ListParams::from_raw(None, None, None, None, Some("  satchel "));
        assert_eq!(p.search.as_deref(), Some("satchel"));
        let p = ListParams::from_raw(None, None, None, None, Some("   "));
        assert!(p.search.is_none());
    }
}
