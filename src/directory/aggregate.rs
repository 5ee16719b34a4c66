//! Aggregation of search events into a single terminal outcome.
//!
//! The aggregator is a two-state machine. While `Collecting` it appends
//! flattened entries in arrival order; the first terminal event (end, fault,
//! or referral) moves it to `Committed` and fixes the outcome. Events
//! observed after the commit are ignored, so an error followed by a late end
//! event cannot alter the response.

use crate::directory::types::{FlattenedEntry, RC_SUCCESS, SearchEvent, SearchFault};
use tokio::sync::mpsc::Receiver;

/// Terminal result of one aggregated search. Exactly one is produced per
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The search finished cleanly; entries are in arrival order.
    Success(Vec<FlattenedEntry>),
    /// The search finished with a non-success result code.
    DirectoryError(u32),
    /// The search base does not exist.
    NotFound(String),
    /// The directory or transport failed mid-search.
    ProtocolError(String),
    /// The server answered with a referral, which the gateway never follows.
    ReferralRejected(Vec<String>),
}

enum State {
    Collecting(Vec<FlattenedEntry>),
    Committed,
}

/// Accumulates one request's search events until a terminal outcome commits.
pub struct Aggregator {
    location: String,
    state: State,
}

impl Aggregator {
    /// Create an aggregator for a search rooted at `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            state: State::Collecting(Vec::new()),
        }
    }

    /// Feed one event, returning the terminal outcome once it commits.
    ///
    /// Returns `None` while still collecting, and also for every event
    /// observed after the outcome has committed.
    pub fn observe(&mut self, event: SearchEvent) -> Option<Outcome> {
        let State::Collecting(entries) = &mut self.state else {
            return None;
        };
        match event {
            SearchEvent::Entry(raw) => {
                entries.push(FlattenedEntry::from(raw));
                None
            }
            SearchEvent::End { status: RC_SUCCESS } => {
                let collected = std::mem::take(entries);
                self.state = State::Committed;
                Some(Outcome::Success(collected))
            }
            SearchEvent::End { status } => {
                self.state = State::Committed;
                Some(Outcome::DirectoryError(status))
            }
            SearchEvent::Fault(SearchFault::NoSuchObject) => {
                self.state = State::Committed;
                Some(Outcome::NotFound(self.location.clone()))
            }
            SearchEvent::Fault(SearchFault::Protocol(message)) => {
                self.state = State::Committed;
                Some(Outcome::ProtocolError(message))
            }
            SearchEvent::Referral(uris) => {
                self.state = State::Committed;
                Some(Outcome::ReferralRejected(uris))
            }
        }
    }

    /// Drain the session's event stream until a terminal outcome commits.
    ///
    /// A stream that closes without a terminal event is reported as a
    /// protocol error; the directory contract promises exactly one end event
    /// per search.
    pub async fn run(mut self, events: &mut Receiver<SearchEvent>) -> Outcome {
        while let Some(event) = events.recv().await {
            if let Some(outcome) = self.observe(event) {
                return outcome;
            }
        }
        Outcome::ProtocolError("search ended without a result".to_string())
    }
}
