// Sink Handles
//
// A sink is a named export rule: entries matching `filter` are routed to
// `destination`. Creating a handle never talks to the service.

use crate::client::Client;

#[derive(Debug, Clone)]
pub struct Sink {
    name: String,
    filter: String,
    destination: String,
    client: Client,
}

impl Sink {
    pub(crate) fn new(
        name: impl Into<String>,
        filter: impl Into<String>,
        destination: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            name: name.into(),
            filter: filter.into(),
            destination: destination.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logging-query expression selecting the exported entries.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Destination URI, e.g. a bucket or dataset.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn project(&self) -> &str {
        self.client.project()
    }

    pub fn full_name(&self) -> String {
        format!("projects/{}/sinks/{}", self.project(), self.name)
    }
}
