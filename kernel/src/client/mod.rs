// Logging Client
//
// Root object of the library: binds a project to a transport, hands out
// logger and sink handles, and lists entries one page at a time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{ClientConfig, ConfigError};
use crate::entries::{materialize, Entry, EntryError, RawEntry};
use crate::logger::Logger;
use crate::sink::Sink;
use crate::transport::{ApiRequest, Transport, TransportError};

mod query;

pub use query::{ListEntriesQuery, ASCENDING, DESCENDING};
use query::ListEntriesResponse;

const LIST_ENTRIES_PATH: &str = "/entries:list";

/// Errors produced while listing entries.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed entries:list response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("entry {index} rejected: {source}")]
    Entry {
        index: usize,
        #[source]
        source: EntryError,
    },
}

/// One page of typed entries plus the cursor for the next page.
#[derive(Debug, Clone)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    /// `None` once the last page has been returned.
    pub next_page_token: Option<String>,
}

struct ClientInner {
    project: String,
    transport: Arc<dyn Transport>,
}

/// Client for the logging API, scoped to a single project.
///
/// Cloning is cheap and clones are the same client (`Client::ptr_eq`).
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("project", &self.inner.project)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(project: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                project: project.into(),
                transport,
            }),
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.project.clone(), transport))
    }

    pub fn project(&self) -> &str {
        &self.inner.project
    }

    /// Whether both values refer to the same client.
    pub fn ptr_eq(a: &Client, b: &Client) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Create a logger handle. Every call returns a new handle.
    pub fn logger(&self, name: impl Into<String>) -> Logger {
        Logger::new(name, self.clone())
    }

    /// Create a sink handle. Nothing is sent to the service.
    pub fn sink(
        &self,
        name: impl Into<String>,
        filter: impl Into<String>,
        destination: impl Into<String>,
    ) -> Sink {
        Sink::new(name, filter, destination, self.clone())
    }

    /// Fetch one page of entries.
    ///
    /// Entries sharing a log name within the page share one `Logger`
    /// handle. A single malformed entry fails the whole call. To read
    /// further pages, pass `next_page_token` back as the query's
    /// `page_token`.
    pub fn list_entries(&self, query: &ListEntriesQuery) -> Result<EntryPage, ListError> {
        let body = query.to_body(self.project());
        debug!(
            project_count = query.projects.len().max(1),
            has_page_token = query.page_token.is_some(),
            "listing entries"
        );

        let response = self
            .inner
            .transport
            .api_request(ApiRequest::post(LIST_ENTRIES_PATH, body))?;
        let response: ListEntriesResponse = serde_json::from_value(response)?;

        let mut loggers: HashMap<String, Arc<Logger>> = HashMap::new();
        let entries = response
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, resource)| {
                RawEntry::from_value(resource)
                    .and_then(|raw| materialize(self, raw, &mut loggers))
                    .map_err(|source| ListError::Entry { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            entry_count = entries.len(),
            logger_count = loggers.len(),
            has_next_page = response.next_page_token.is_some(),
            "listed entries"
        );

        Ok(EntryPage {
            entries,
            next_page_token: response.next_page_token,
        })
    }
}
