use serde::{Deserialize, Serialize};

/// Raw paging/search parameters as they arrive on the query string.
/// Both the posts and classes listings share this shape.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// Normalized paging parameters ready to hand to a repo query.
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    /// Escaped `ILIKE` pattern (`%term%`), absent when no usable search term
    /// was supplied.
    pub search: Option<String>,
}

impl PageQuery {
    /// Floor page and limit at 1, derive the row offset, and turn the search
    /// term into a case-insensitive substring pattern.
    pub fn normalize(&self, default_limit: i64) -> PageSpec {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).max(1);
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        PageSpec {
            page,
            limit,
            offset: (page - 1) * limit,
            search,
        }
    }
}

/// Wrap a term in `%...%` for `ILIKE`, escaping the pattern metacharacters
/// so user input only ever matches as a literal substring.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Listing envelope shared by every paginated endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(spec: &PageSpec, total: i64, results: Vec<T>) -> Self {
        let total_pages = ((total + spec.limit - 1) / spec.limit).max(1);
        Self {
            page: spec.page,
            limit: spec.limit,
            total,
            total_pages,
            has_prev: spec.page > 1,
            has_next: spec.page < total_pages,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, limit: Option<i64>, search: Option<&str>) -> PageQuery {
        PageQuery {
            page,
            limit,
            search: search.map(str::to_string),
        }
    }

    #[test]
    fn defaults_apply_when_params_absent() {
        let spec = query(None, None, None).normalize(5);
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 5);
        assert_eq!(spec.offset, 0);
        assert!(spec.search.is_none());
    }

    #[test]
    fn page_and_limit_are_floored_at_one() {
        let spec = query(Some(0), Some(-3), None).normalize(10);
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 1);
        assert_eq!(spec.offset, 0);
    }

    #[test]
    fn second_page_of_three_over_ten_records() {
        let spec = query(Some(2), Some(3), None).normalize(5);
        assert_eq!(spec.offset, 3);

        let page = Paginated::new(&spec, 10, vec![4, 5, 6]);
        assert_eq!(page.total_pages, 4);
        assert!(page.has_prev);
        assert!(page.has_next);
    }

    #[test]
    fn oversized_limit_yields_single_page() {
        let spec = query(None, Some(50), None).normalize(5);
        let page = Paginated::new(&spec, 10, vec![0; 10]);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn empty_listing_still_reports_one_page() {
        let spec = query(None, None, None).normalize(5);
        let page = Paginated::new(&spec, 0, Vec::<i32>::new());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
    }

    #[test]
    fn blank_search_is_dropped() {
        let spec = query(None, None, Some("   ")).normalize(5);
        assert!(spec.search.is_none());
    }

    #[test]
    fn search_term_becomes_escaped_pattern() {
        let spec = query(None, None, Some("  50%_off  ")).normalize(5);
        assert_eq!(spec.search.as_deref(), Some(r"%50\%\_off%"));
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let spec = query(Some(2), Some(3), None).normalize(5);
        let page = Paginated::new(&spec, 10, vec![1]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 4);
        assert_eq!(json["hasPrev"], true);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["results"][0], 1);
    }
}
