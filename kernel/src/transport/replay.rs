// In-Memory Replay Transport
//
// Hands out pre-recorded responses in order and records every request it
// receives. Backs the dry-run CLI and the test suites.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{ApiRequest, Transport, TransportError};

#[derive(Debug, Default)]
struct ReplayState {
    responses: VecDeque<Result<Value, String>>,
    requested: Vec<ApiRequest>,
}

#[derive(Debug, Default)]
pub struct ReplayTransport {
    state: Mutex<ReplayState>,
}

impl ReplayTransport {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            state: Mutex::new(ReplayState {
                responses: responses.into_iter().map(Ok).collect(),
                requested: Vec::new(),
            }),
        }
    }

    /// Queue a successful response behind any already queued.
    pub fn push_response(&self, response: Value) {
        self.lock().responses.push_back(Ok(response));
    }

    /// Queue a failure; the matching request returns `TransportError::Failed`.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().responses.push_back(Err(message.into()));
    }

    /// Requests received so far, oldest first.
    pub fn requested(&self) -> Vec<ApiRequest> {
        self.lock().requested.clone()
    }

    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }

    // Every mutation is a single push/pop, so a poisoned state is still whole.
    fn lock(&self) -> MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for ReplayTransport {
    fn api_request(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let mut state = self.lock();
        let next = state.responses.pop_front();
        let method = request.method;
        let path = request.path.clone();
        state.requested.push(request);

        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Failed(message)),
            None => Err(TransportError::Exhausted { method, path }),
        }
    }
}
