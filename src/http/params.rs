//! Query-string parsing for `/api/getData`.

use crate::pagination::clamp_page_size;

/// Validated page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub search: String,
    pub page: u32,
    pub page_size: u32,
}

impl PageQuery {
    /// Parse `search`, `page` and `pageSize` from a raw query string.
    ///
    /// Missing, unparsable or non-positive `page` becomes 1. Missing or
    /// unparsable `pageSize` becomes `default_page_size`; any value is then
    /// clamped to `1..=max_page_size`. Unknown keys are ignored and the last
    /// occurrence of a repeated key wins.
    pub fn parse(query: &str, default_page_size: u32, max_page_size: u32) -> Self {
        let mut search = None;
        let mut page = None;
        let mut page_size = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => search = Some(value.into_owned()),
                "page" => page = Some(value.into_owned()),
                "pageSize" => page_size = Some(value.into_owned()),
                _ => {}
            }
        }

        let page = page
            .as_deref()
            .and_then(parse_int)
            .map_or(1, |p| p.clamp(1, i64::from(u32::MAX)) as u32);
        let page_size = page_size
            .as_deref()
            .and_then(parse_int)
            .map_or(default_page_size, |s| s.clamp(0, i64::from(u32::MAX)) as u32);

        Self {
            search: search.unwrap_or_default().trim().to_string(),
            page,
            page_size: clamp_page_size(page_size, max_page_size),
        }
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> PageQuery {
        PageQuery::parse(query, 8, 100)
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            parse(""),
            PageQuery {
                search: String::new(),
                page: 1,
                page_size: 8
            }
        );
    }

    #[test]
    fn test_values_are_decoded() {
        let q = parse("search=abc%20mill&page=3&pageSize=12");
        assert_eq!(q.search, "abc mill");
        assert_eq!(q.page, 3);
        assert_eq!(q.page_size, 12);
        assert_eq!(parse("search=+F100+").search, "F100");
    }

    #[test]
    fn test_page_is_tolerant() {
        assert_eq!(parse("page=0").page, 1);
        assert_eq!(parse("page=-4").page, 1);
        assert_eq!(parse("page=two").page, 1);
        assert_eq!(parse("page=99999999999").page, u32::MAX);
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(parse("pageSize=0").page_size, 1);
        assert_eq!(parse("pageSize=-1").page_size, 1);
        assert_eq!(parse("pageSize=1000").page_size, 100);
        assert_eq!(parse("pageSize=abc").page_size, 8);
    }
}
