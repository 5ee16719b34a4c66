//! Translation of HTTP request parts into directory search parameters.
//!
//! The request path carries the target location with the most specific
//! component first (`/dc=com/dc=example/ou=people`), which is the reverse of
//! how a distinguished name reads. The query string carries the filter
//! expression and a numeric scope code.

/// Filter substituted when the request supplies no `filter` parameter.
pub const DEFAULT_FILTER: &str = "(objectClass=*)";

/// Search breadth relative to the base entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// The named entry only.
    Base,
    /// Immediate children of the named entry.
    OneLevel,
    /// The named entry and all descendants.
    Subtree,
}

impl SearchScope {
    /// Translate a numeric scope code from the query string.
    ///
    /// `0` is base, `1` one-level, `2` subtree. Any other value, including
    /// absence, falls back to base. The translation always goes through the
    /// numeric code so that the wire scope matches what the caller asked for.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("1") => Self::OneLevel,
            Some("2") => Self::Subtree,
            _ => Self::Base,
        }
    }
}

/// Parameters for one directory search, constructed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Distinguished name of the search base.
    pub base: String,
    /// Filter expression, used verbatim.
    pub filter: String,
    /// Search breadth.
    pub scope: SearchScope,
}

/// Derive a distinguished name from an HTTP request path.
///
/// Path segments are split on `/`, the leading empty segment is discarded,
/// the remainder is reversed and joined with `,`. Segments are passed through
/// verbatim; malformed attribute=value pairs surface later as a directory
/// error. An empty path yields an empty location, which the directory treats
/// as the root.
#[must_use]
pub fn dn_from_path(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed.split('/').rev().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_FILTER, SearchScope, dn_from_path};

    #[test]
    fn path_segments_reverse_into_dn() {
        assert_eq!(
            dn_from_path("/dc=com/dc=example/ou=people"),
            "ou=people,dc=example,dc=com"
        );
    }

    #[test]
    fn wildcard_capture_without_leading_slash_resolves() {
        assert_eq!(
            dn_from_path("dc=com/dc=example/ou=mathematicians"),
            "ou=mathematicians,dc=example,dc=com"
        );
    }

    #[test]
    fn root_path_yields_empty_location() {
        assert_eq!(dn_from_path("/"), "");
        assert_eq!(dn_from_path(""), "");
    }

    #[test]
    fn malformed_segments_pass_through_verbatim() {
        assert_eq!(dn_from_path("/dc=com/not-an-rdn"), "not-an-rdn,dc=com");
    }

    #[test]
    fn scope_codes_map_totally_with_base_default() {
        assert_eq!(SearchScope::from_code(Some("0")), SearchScope::Base);
        assert_eq!(SearchScope::from_code(Some("1")), SearchScope::OneLevel);
        assert_eq!(SearchScope::from_code(Some("2")), SearchScope::Subtree);
        assert_eq!(SearchScope::from_code(Some("7")), SearchScope::Base);
        assert_eq!(SearchScope::from_code(Some("sub")), SearchScope::Base);
        assert_eq!(SearchScope::from_code(None), SearchScope::Base);
    }

    #[test]
    fn default_filter_matches_everything() {
        assert_eq!(DEFAULT_FILTER, "(objectClass=*)");
    }
}
