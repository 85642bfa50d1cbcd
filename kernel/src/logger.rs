// Logger Handles
//
// A logger names one log stream inside the owning client's project.

use crate::client::Client;

/// Handle to a named log stream.
///
/// Handles are plain values: two handles with the same name are
/// independent instances unless they came out of the same cache.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    client: Client,
}

impl Logger {
    pub(crate) fn new(name: impl Into<String>, client: Client) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Project the logger belongs to, inherited from its client.
    pub fn project(&self) -> &str {
        self.client.project()
    }

    /// Fully-qualified resource name, as it appears in `logName`.
    pub fn full_name(&self) -> String {
        format!("projects/{}/logs/{}", self.project(), self.name)
    }
}
