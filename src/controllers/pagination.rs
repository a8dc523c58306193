use serde::Deserialize;

fn default_size() -> i64 {
    10
}

/// Common list-endpoint parameters: zero-based page, page size, sort key,
/// sort direction and free-text search.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn like_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", term))
    }

    pub fn sort_key<'a>(&'a self, default: &'a str) -> &'a str {
        self.sort_by.as_deref().unwrap_or(default)
    }

    pub fn descending(&self, default: bool) -> bool {
        match self.sort_dir.as_deref() {
            Some(dir) => dir.eq_ignore_ascii_case("desc"),
            None => default,
        }
    }

    pub fn limit(&self) -> i64 {
        self.size.max(1)
    }

    pub fn offset(&self) -> i64 {
        self.page.max(0) * self.limit()
    }
}

pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ListQuery {
            page: 0,
            size: 10,
            sort_by: None,
            sort_dir: None,
            search: Some("   ".to_string()),
        };
        assert_eq!(query.like_pattern(), None);
    }
}
