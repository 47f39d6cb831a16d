// Query parameter builder for item reads

use serde_json::Value;

/// Metadata counts that can be requested alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    TotalCount,
    FilterCount,
    /// Every available count.
    All,
}

impl MetaField {
    fn as_param(&self) -> &'static str {
        match self {
            MetaField::TotalCount => "total_count",
            MetaField::FilterCount => "filter_count",
            MetaField::All => "*",
        }
    }
}

/// Query options for item operations, serialized to query parameters.
///
/// `filter` is an arbitrary filter tree and travels JSON-encoded in a single
/// parameter; the scalar options map one-to-one.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub fields: Option<Vec<String>>,
    pub sort: Option<Vec<String>>,
    pub filter: Option<Value>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
    pub meta: Option<MetaField>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sort fields; prefix with `-` for descending order.
    pub fn sort<I, S>(mut self, sort: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = Some(sort.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn meta(mut self, meta: MetaField) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Serializes the query into URL parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(fields) = &self.fields {
            params.push(("fields".to_string(), fields.join(",")));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.join(",")));
        }
        if let Some(filter) = &self.filter {
            params.push(("filter".to_string(), filter.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(meta) = self.meta {
            params.push(("meta".to_string(), meta.as_param().to_string()));
        }

        params
    }
}
