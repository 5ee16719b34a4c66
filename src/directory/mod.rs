//! Directory integration: shared connection, search session, and the
//! aggregation of streamed results into one terminal outcome.

pub mod aggregate;
pub mod session;
pub mod types;

pub use aggregate::{Aggregator, Outcome};
pub use session::{DirectoryError, DirectorySearch, LdapDirectory};
pub use types::{FlattenedEntry, RawAttribute, RawEntry, SearchEvent, SearchFault};
