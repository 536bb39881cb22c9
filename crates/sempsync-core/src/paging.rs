//! Paginated collection reads against the config or monitor API.

use std::future::Future;

use log::debug;
use reqwest::Method;
use serde_json::Value;

use crate::client::SempClient;
use crate::error::SempResult;
use crate::paths::compose_path;
use crate::types::{SEMP_V2_CONFIG, SEMP_V2_MONITOR};

/// Which management API root a listing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiFlavour {
    #[default]
    Config,
    Monitor,
}

impl ApiFlavour {
    pub fn root(self) -> &'static str {
        match self {
            Self::Config => SEMP_V2_CONFIG,
            Self::Monitor => SEMP_V2_MONITOR,
        }
    }
}

/// Filter and field-selection parameters for a collection read.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub api: ApiFlavour,
    /// `select=` field names, comma-joined.
    pub select: Vec<String>,
    /// `where=` expressions, comma-joined; embedded `/` is encoded so topic
    /// patterns survive as one expression.
    pub where_clauses: Vec<String>,
}

impl ListQuery {
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn where_clause(mut self, expr: impl Into<String>) -> Self {
        self.where_clauses.push(expr.into());
        self
    }

    pub fn monitor(mut self) -> Self {
        self.api = ApiFlavour::Monitor;
        self
    }

    /// Query string, always starting from the default page size.
    pub fn to_query_string(&self) -> String {
        let mut query = String::from("count=100");
        if !self.select.is_empty() {
            query.push_str("&select=");
            query.push_str(&self.select.join(","));
        }
        if !self.where_clauses.is_empty() {
            let encoded: Vec<String> = self
                .where_clauses
                .iter()
                .map(|w| w.replace('/', "%2F"))
                .collect();
            query.push_str("&where=");
            query.push_str(&encoded.join(","));
        }
        query
    }
}

/// Follow `meta.paging.nextPageUri` until exhausted, accumulating every
/// page's `data` array. Any page failure aborts the whole listing.
pub async fn accumulate_pages<F, Fut>(first_url: String, mut fetch: F) -> SempResult<Vec<Value>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = SempResult<Value>>,
{
    let mut items: Vec<Value> = Vec::new();
    let mut url = first_url;

    loop {
        debug!("page: {}", url);
        let body = fetch(url).await?;
        if let Some(data) = body.get("data").and_then(Value::as_array) {
            items.extend(data.iter().cloned());
        }
        match body
            .pointer("/meta/paging/nextPageUri")
            .and_then(Value::as_str)
        {
            Some(next) if !next.is_empty() => url = next.to_string(),
            _ => break,
        }
    }

    Ok(items)
}

/// Read a whole collection through the direct backend.
pub async fn get_collection(
    client: &SempClient,
    segments: &[&str],
    query: &ListQuery,
) -> SempResult<Vec<Value>> {
    let mut all: Vec<&str> = vec![query.api.root()];
    all.extend_from_slice(segments);
    let path = compose_path(&all)?;
    let first_url = format!(
        "{}{}?{}",
        client.config().base_url(),
        path,
        query.to_query_string()
    );
    accumulate_pages(first_url, |url| async move {
        client.request_raw_url(Method::GET, &url, None).await
    })
    .await
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SempError;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[test]
    fn query_default_is_page_size_only() {
        assert_eq!(ListQuery::default().to_query_string(), "count=100");
    }

    #[test]
    fn query_with_select_and_where() {
        let q = ListQuery::default()
            .select(&["queueName", "eventBindCountThreshold"])
            .where_clause("queueName==q*");
        assert_eq!(
            q.to_query_string(),
            "count=100&select=queueName,eventBindCountThreshold&where=queueName==q*"
        );
    }

    #[test]
    fn query_where_encodes_slashes() {
        let q = ListQuery::default().where_clause("subscriptionTopic==a/b/c");
        assert_eq!(
            q.to_query_string(),
            "count=100&where=subscriptionTopic==a%2Fb%2Fc"
        );
    }

    #[test]
    fn monitor_flavour_switches_root() {
        assert_eq!(ApiFlavour::Monitor.root(), "/SEMP/v2/monitor");
        assert_eq!(ListQuery::default().monitor().api, ApiFlavour::Monitor);
    }

    #[tokio::test]
    async fn three_pages_accumulate_six_items() {
        let mut pages = HashMap::new();
        pages.insert(
            "p1".to_string(),
            json!({
                "data": [{"n": 1}, {"n": 2}],
                "meta": {"paging": {"nextPageUri": "p2"}}
            }),
        );
        pages.insert(
            "p2".to_string(),
            json!({
                "data": [{"n": 3}, {"n": 4}],
                "meta": {"paging": {"nextPageUri": "p3"}}
            }),
        );
        pages.insert(
            "p3".to_string(),
            json!({"data": [{"n": 5}, {"n": 6}], "meta": {}}),
        );

        let items = accumulate_pages("p1".to_string(), |url| {
            let page = pages.get(&url).cloned();
            async move { Ok(page.expect("unexpected page url")) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 6);
        assert_eq!(items[0]["n"], json!(1));
        assert_eq!(items[5]["n"], json!(6));
    }

    #[tokio::test]
    async fn single_page_without_meta() {
        let items = accumulate_pages("only".to_string(), |_| async {
            Ok(json!({"data": [{"queueName": "q1"}]}))
        })
        .await
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn page_failure_aborts_listing() {
        let calls = RefCell::new(0u32);
        let err = accumulate_pages("p1".to_string(), |url| {
            *calls.borrow_mut() += 1;
            async move {
                if url == "p1" {
                    Ok(json!({
                        "data": [{"n": 1}],
                        "meta": {"paging": {"nextPageUri": "p2"}}
                    }))
                } else {
                    Err(SempError::remote(500, "boom"))
                }
            }
        })
        .await
        .unwrap_err();
        assert_eq!(err.status_code, Some(500));
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn empty_collection_yields_empty_list() {
        let items = accumulate_pages("p".to_string(), |_| async { Ok(json!({"meta": {}})) })
            .await
            .unwrap();
        assert!(items.is_empty());
    }
}
