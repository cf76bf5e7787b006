use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Keyword + type filtered, sortable, paginated search parameters shared by
/// every tenant-data search operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub keyword: Option<String>,

    #[serde(rename = "type")]
    pub type_filter: Option<String>,

    pub sort_by: Option<String>,
    pub order_by: Option<SortOrder>,

    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            type_filter: None,
            sort_by: None,
            order_by: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl SearchRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.limit
    }

    pub fn keyword_trimmed(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn type_filter_trimmed(&self) -> Option<&str> {
        self.type_filter
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn order(&self) -> SortOrder {
        self.order_by.unwrap_or(SortOrder::Asc)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: i64,
    pub item_count: i64,
    pub items_per_page: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl PageMeta {
    pub fn new(total_items: i64, item_count: usize, limit: i64, page: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_items + limit - 1) / limit
        } else {
            0
        };
        Self {
            total_items,
            item_count: item_count as i64,
            items_per_page: limit,
            total_pages,
            current_page: page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: i64, search: &SearchRequest) -> Self {
        let meta = PageMeta::new(total_items, items.len(), search.limit, search.page);
        Self { items, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_rounds_pages_up() {
        let meta = PageMeta::new(21, 10, 10, 1);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.item_count, 10);
        assert_eq!(meta.items_per_page, 10);
    }

    #[test]
    fn meta_handles_zero_limit() {
        let meta = PageMeta::new(5, 0, 0, 1);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn offset_never_negative() {
        let search = SearchRequest {
            page: 0,
            limit: 25,
            ..Default::default()
        };
        assert_eq!(search.offset(), 0);
    }

    #[test]
    fn blank_keyword_is_ignored() {
        let search = SearchRequest {
            keyword: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(search.keyword_trimmed(), None);
    }

    #[test]
    fn query_string_defaults_apply() {
        let search: SearchRequest = serde_json::from_str(r#"{"keyword":"ops"}"#).unwrap();
        assert_eq!(search.page, 1);
        assert_eq!(search.limit, 10);
        assert_eq!(search.keyword_trimmed(), Some("ops"));
    }

    #[test]
    fn order_aliases_uppercase() {
        let order: SortOrder = serde_json::from_str("\"DESC\"").unwrap();
        assert_eq!(order, SortOrder::Desc);
    }
}
