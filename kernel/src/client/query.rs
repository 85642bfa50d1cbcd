// Entry Listing Query
//
// Caller-facing query parameters, their request body, and the wire shape
// of the `entries:list` response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Oldest entries first.
pub const ASCENDING: &str = "timestamp asc";

/// Newest entries first.
pub const DESCENDING: &str = "timestamp desc";

/// Parameters of a single `entries:list` call.
///
/// Unset fields are left out of the request body entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListEntriesQuery {
    /// Projects to search; empty means the client's own project.
    pub projects: Vec<String>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
}

impl ListEntriesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = Some(page_token.into());
        self
    }

    /// Body of `POST /entries:list`, keyed by wire names.
    pub(crate) fn to_body(&self, default_project: &str) -> Map<String, Value> {
        let project_ids = if self.projects.is_empty() {
            vec![default_project.to_string()]
        } else {
            self.projects.clone()
        };

        let mut body = Map::new();
        body.insert("projectIds".into(), Value::from(project_ids));
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            body.insert("filter".into(), Value::from(filter));
        }
        if let Some(order_by) = &self.order_by {
            body.insert("orderBy".into(), Value::from(order_by.as_str()));
        }
        if let Some(page_size) = self.page_size {
            body.insert("pageSize".into(), Value::from(page_size));
        }
        if let Some(page_token) = &self.page_token {
            body.insert("pageToken".into(), Value::from(page_token.as_str()));
        }
        body
    }
}

/// Response of `POST /entries:list`. Entries stay untyped until the
/// factory has seen them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListEntriesResponse {
    #[serde(default)]
    pub entries: Vec<Value>,
    pub next_page_token: Option<String>,
}
