//! PostgREST query-string builder.
//!
//! Produces the `(key, value)` pairs of a `select` against
//! `/rest/v1/{collection}`. Percent-encoding is left to `reqwest`.

/// A single `select` request against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestQuery {
    collection: String,
    columns: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
}

impl RestQuery {
    /// Start a `select=*` query on `collection`.
    pub fn select(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Restrict the returned columns (`select=id,code`).
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// `field=eq.value`
    pub fn eq(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((field.into(), format!("eq.{}", value.to_string())));
        self
    }

    /// `field=in.(a,b,c)`
    pub fn in_list<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filters.push((field.into(), format!("in.({})", joined)));
        self
    }

    /// `order=field.asc`
    pub fn order_asc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(format!("{}.asc", field.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query pairs in the order PostgREST documents them.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        pairs.push(("select".to_string(), self.columns.clone()));
        pairs.extend(self.filters.iter().cloned());
        if let Some(ref order) = self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Unencoded query string, for logs.
    pub fn to_query_string(&self) -> String {
        self.pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}
