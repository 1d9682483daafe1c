//! Transport-neutral view of an inbound request and its identity metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Case-insensitive key/value lookup over request metadata.
pub trait MetadataSource {
    fn get(&self, key: &str) -> Option<&str>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Where the SSO agent places its attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataMode {
    /// HTTP request headers.
    #[default]
    Headers,
    /// Server environment variables (`ShibUseHeaders Off`).
    ServerVars,
}

impl MetadataMode {
    pub fn from_use_headers(use_headers: bool) -> Self {
        if use_headers {
            Self::Headers
        } else {
            Self::ServerVars
        }
    }
}

/// Inbound request as seen by the reconciliation core.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// `http` or `https`.
    pub scheme: String,
    /// Host as sent by the client, including any port.
    pub host: String,
    /// Path plus query string, e.g. `/dashboard?tab=1`.
    pub path_and_query: String,
    /// Request headers (name -> values).
    pub headers: HashMap<String, Vec<String>>,
    /// Server environment variables exported by the SSO agent.
    pub server_vars: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(host: impl Into<String>, path_and_query: impl Into<String>) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.into(),
            path_and_query: path_and_query.into(),
            headers: HashMap::new(),
            server_vars: HashMap::new(),
        }
    }

    /// Build from a proxy header map, reading host and path from the
    /// pseudo-headers the proxy forwards.
    ///
    /// Header names are lowercased; values of names differing only in case
    /// are merged in name order.
    pub fn from_headers(headers: HashMap<String, Vec<String>>) -> Self {
        let mut entries: Vec<_> = headers.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, values) in entries {
            headers.entry(header_key(&name)).or_default().extend(values);
        }

        let source = HeaderSource(&headers);
        let host = source
            .value("host")
            .or_else(|| source.value(":authority"))
            .unwrap_or_default()
            .to_string();
        let path_and_query = source
            .value("path")
            .or_else(|| source.value(":path"))
            .unwrap_or("/")
            .to_string();
        let scheme = source
            .value(":scheme")
            .or_else(|| source.value("x-forwarded-proto"))
            .unwrap_or("https")
            .to_ascii_lowercase();

        Self {
            scheme,
            host,
            path_and_query,
            headers,
            server_vars: HashMap::new(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Append a header value. Names are stored lowercased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .entry(header_key(name.as_ref()))
            .or_default()
            .push(value.into());
        self
    }

    /// Set a server variable. Names are stored lowercased with `-` as `_`,
    /// so a later spelling of the same variable replaces an earlier one.
    pub fn with_server_var(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.server_vars.insert(var_key(name.as_ref()), value.into());
        self
    }

    /// Absolute URI of the current request.
    pub fn current_uri(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path_and_query)
    }

    /// First value of a header, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        HeaderSource(&self.headers).value(name)
    }

    /// Metadata view for the given mode.
    pub fn metadata(&self, mode: MetadataMode) -> RequestMetadata<'_> {
        match mode {
            MetadataMode::Headers => RequestMetadata::Headers(HeaderSource(&self.headers)),
            MetadataMode::ServerVars => {
                RequestMetadata::ServerVars(ServerVarSource(&self.server_vars))
            }
        }
    }
}

/// Header lookup; multi-valued headers yield their first value.
#[derive(Debug, Clone, Copy)]
pub struct HeaderSource<'a>(pub &'a HashMap<String, Vec<String>>);

impl<'a> HeaderSource<'a> {
    /// First value of `key`, borrowed from the underlying map.
    pub fn value(&self, key: &str) -> Option<&'a str> {
        lookup(self.0, key, header_key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

impl MetadataSource for HeaderSource<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.value(key)
    }
}

/// Server variable lookup. `-` and `_` are interchangeable so header-style
/// keys also match CGI-style variable names.
#[derive(Debug, Clone, Copy)]
pub struct ServerVarSource<'a>(pub &'a HashMap<String, String>);

impl<'a> ServerVarSource<'a> {
    pub fn value(&self, key: &str) -> Option<&'a str> {
        lookup(self.0, key, var_key).map(String::as_str)
    }
}

impl MetadataSource for ServerVarSource<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.value(key)
    }
}

fn header_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

fn var_key(name: &str) -> String {
    name.chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Resolve `key` under `normalize`.
///
/// The normalized spelling wins. Otherwise exactly one matching entry is
/// required: a key spelled several ways in a hand-built map is ambiguous and
/// treated as absent.
fn lookup<'a, V>(
    map: &'a HashMap<String, V>,
    key: &str,
    normalize: fn(&str) -> String,
) -> Option<&'a V> {
    let wanted = normalize(key);
    if let Some(value) = map.get(&wanted) {
        return Some(value);
    }

    let mut matches = map.iter().filter(|(k, _)| normalize(k) == wanted);
    let (_, value) = matches.next()?;
    if matches.next().is_some() {
        warn!(key = %key, "Metadata key present under several spellings, ignoring");
        return None;
    }
    Some(value)
}

/// Metadata view selected by [`MetadataMode`].
#[derive(Debug, Clone, Copy)]
pub enum RequestMetadata<'a> {
    Headers(HeaderSource<'a>),
    ServerVars(ServerVarSource<'a>),
}

impl MetadataSource for RequestMetadata<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        match self {
            RequestMetadata::Headers(h) => h.get(key),
            RequestMetadata::ServerVars(v) => v.get(key),
        }
    }
}

impl MetadataSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<&str> {
        lookup(self, key, header_key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_case_insensitive() {
        let request = RequestContext::new("example.org", "/")
            .with_header("Shib-Identity-Provider", "https://idp.example.org");
        let meta = request.metadata(MetadataMode::Headers);
        assert_eq!(meta.get("shib-identity-provider"), Some("https://idp.example.org"));
        assert!(meta.has("SHIB-IDENTITY-PROVIDER"));
        assert!(!meta.has("shib-person-uid"));
    }

    #[test]
    fn test_server_var_lookup() {
        let request = RequestContext::new("example.org", "/")
            .with_server_var("SHIB_PERSON_UID", "alice")
            .with_header("shib-person-uid", "mallory");
        let meta = request.metadata(MetadataMode::ServerVars);
        assert_eq!(meta.get("shib-person-uid"), Some("alice"));
        assert_eq!(meta.get("shib-person"), None);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HashMap::new();
        headers.insert("Host".to_string(), vec!["example.org".to_string()]);
        headers.insert(":path".to_string(), vec!["/dashboard?x=1".to_string()]);
        let request = RequestContext::from_headers(headers);
        assert_eq!(request.current_uri(), "https://example.org/dashboard?x=1");

        let request = RequestContext::from_headers(HashMap::new());
        assert_eq!(request.path_and_query, "/");
    }

    #[test]
    fn test_header_accessor() {
        let request = RequestContext::new("example.org", "/logout")
            .with_header("Referer", "https://example.org/page");
        assert_eq!(request.header("referer"), Some("https://example.org/page"));
        assert_eq!(request.header("REFERER"), Some("https://example.org/page"));
        assert_eq!(request.header("origin"), None);
    }

    #[test]
    fn test_header_spellings_are_merged() {
        for _ in 0..50 {
            let request = RequestContext::new("example.org", "/")
                .with_header("shib-person-uid", "alice")
                .with_header("Shib-Person-Uid", "mallory");

            assert_eq!(request.headers.len(), 1);
            let meta = request.metadata(MetadataMode::Headers);
            assert_eq!(meta.get("SHIB-PERSON-UID"), Some("alice"));
        }
    }

    #[test]
    fn test_from_headers_merges_spellings_in_name_order() {
        for _ in 0..50 {
            let mut headers = HashMap::new();
            headers.insert("shib-person-uid".to_string(), vec!["alice".to_string()]);
            headers.insert("Shib-Person-Uid".to_string(), vec!["mallory".to_string()]);
            let request = RequestContext::from_headers(headers);

            assert_eq!(
                request.headers.get("shib-person-uid"),
                Some(&vec!["mallory".to_string(), "alice".to_string()])
            );
            assert_eq!(request.header("shib-person-uid"), Some("mallory"));
        }
    }

    #[test]
    fn test_ambiguous_raw_map_key_is_absent() {
        let mut headers = HashMap::new();
        headers.insert("Shib-Person-Uid".to_string(), vec!["alice".to_string()]);
        headers.insert("SHIB-PERSON-UID".to_string(), vec!["mallory".to_string()]);
        assert_eq!(HeaderSource(&headers).get("shib-person-uid"), None);

        headers.insert("shib-person-uid".to_string(), vec!["carol".to_string()]);
        assert_eq!(HeaderSource(&headers).get("Shib-Person-Uid"), Some("carol"));
    }

    #[test]
    fn test_server_var_spellings_collapse() {
        let request = RequestContext::new("example.org", "/")
            .with_server_var("shib-person-uid", "mallory")
            .with_server_var("SHIB_PERSON_UID", "alice");
        assert_eq!(request.server_vars.len(), 1);

        let meta = request.metadata(MetadataMode::ServerVars);
        assert_eq!(meta.get("Shib-Person-Uid"), Some("alice"));
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(MetadataMode::from_use_headers(true), MetadataMode::Headers);
        assert_eq!(MetadataMode::from_use_headers(false), MetadataMode::ServerVars);
    }
}
