//! Search session against the shared directory connection.
//!
//! The process holds one multiplexed LDAP connection, established and bound
//! at startup. Each request clones the lightweight `Ldap` handle, issues
//! exactly one search, and receives the session's events through a channel.
//! The session performs no retry and no timeout of its own.

use crate::config::Config;
use crate::directory::types::{
    RC_NO_SUCH_OBJECT, RawAttribute, RawEntry, SearchEvent, SearchFault,
};
use crate::query::{QueryDescriptor, SearchScope};
use async_trait::async_trait;
use ldap3::result::SearchResult;
use ldap3::{Ldap, LdapConnAsync, Scope, SearchEntry};
use thiserror::Error;
use tokio::sync::mpsc::{self, Receiver};

const EVENT_BUFFER: usize = 32;

/// Errors raised by the directory integration.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The initial connection could not be established.
    #[error("directory connection failed: {0}")]
    Connect(String),
    /// The initial bind was rejected.
    #[error("directory bind failed: {0}")]
    Bind(String),
    /// The search operation could not be issued on the shared connection.
    #[error("failed to issue directory search: {0}")]
    Search(String),
}

/// Abstraction over the directory search session used by the HTTP surface.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Issue one search and return the event stream for it.
    ///
    /// A synchronous error means the search could not be started at all; no
    /// events are produced in that case.
    async fn search(&self, query: &QueryDescriptor) -> Result<Receiver<SearchEvent>, DirectoryError>;
}

/// Directory backend speaking LDAP over a single shared connection.
pub struct LdapDirectory {
    ldap: Ldap,
}

impl LdapDirectory {
    /// Connect to the directory and perform the initial simple bind.
    ///
    /// The connection driver runs on a background task for the process
    /// lifetime; if the connection reports an error at any point the process
    /// terminates rather than continue serving degraded requests.
    pub async fn connect(config: &Config) -> Result<Self, DirectoryError> {
        let (conn, mut ldap) = LdapConnAsync::new(&config.ldap_url)
            .await
            .map_err(|err| DirectoryError::Connect(err.to_string()))?;
        tokio::spawn(async move {
            if let Err(err) = conn.drive().await {
                tracing::error!(error = %err, "Directory connection failed; shutting down");
                std::process::exit(1);
            }
        });

        let bind_dn = config.bind_dn.as_deref().unwrap_or_default();
        let bind_password = config.bind_password.as_deref().unwrap_or_default();
        ldap.simple_bind(bind_dn, bind_password)
            .await
            .map_err(|err| DirectoryError::Bind(err.to_string()))?
            .success()
            .map_err(|err| DirectoryError::Bind(err.to_string()))?;
        tracing::info!(url = %config.ldap_url, bind_dn, "Connected and bound to directory");

        Ok(Self { ldap })
    }
}

#[async_trait]
impl DirectorySearch for LdapDirectory {
    async fn search(&self, query: &QueryDescriptor) -> Result<Receiver<SearchEvent>, DirectoryError> {
        // `Ldap` is a cheap handle; clones multiplex over the one connection,
        // so concurrent requests do not serialize behind each other.
        let mut ldap = self.ldap.clone();
        let result = ldap
            .search(
                &query.base,
                query.scope.into(),
                &query.filter,
                Vec::<&str>::new(),
            )
            .await
            .map_err(|err| DirectoryError::Search(err.to_string()))?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(async move {
            deliver_events(result, tx).await;
        });
        Ok(rx)
    }
}

/// Replay one search result as the session's event stream.
///
/// Send failures mean the receiving side has already committed an outcome
/// and dropped the channel; remaining events are discarded.
async fn deliver_events(result: SearchResult, tx: mpsc::Sender<SearchEvent>) {
    let SearchResult(result_entries, res) = result;

    if res.rc == RC_NO_SUCH_OBJECT {
        let _ = tx.send(SearchEvent::Fault(SearchFault::NoSuchObject)).await;
        return;
    }
    if !res.refs.is_empty() {
        let _ = tx.send(SearchEvent::Referral(res.refs)).await;
        return;
    }
    for result_entry in result_entries {
        if result_entry.is_ref() {
            let _ = tx.send(SearchEvent::Referral(Vec::new())).await;
            return;
        }
        let entry = SearchEntry::construct(result_entry);
        if tx.send(SearchEvent::Entry(raw_entry(entry))).await.is_err() {
            return;
        }
    }
    let _ = tx.send(SearchEvent::End { status: res.rc }).await;
}

fn raw_entry(entry: SearchEntry) -> RawEntry {
    let mut attributes: Vec<RawAttribute> = entry
        .attrs
        .into_iter()
        .map(|(name, values)| RawAttribute { name, values })
        .collect();
    // Values the server delivered as raw bytes are kept, lossily, so that no
    // attribute disappears from the flattened map.
    for (name, values) in entry.bin_attrs {
        attributes.push(RawAttribute {
            name,
            values: values
                .into_iter()
                .map(|value| String::from_utf8_lossy(&value).into_owned())
                .collect(),
        });
    }
    RawEntry {
        dn: entry.dn,
        attributes,
    }
}

impl From<SearchScope> for Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }
}
