// src/filter.rs
//! Deny-list over publisher hosts. Certain large outlets serve paywalled or
//! JS-rendered shells the extractor cannot parse; skipping them up front
//! saves the network round-trip.

use url::Url;

#[derive(Debug, Clone)]
pub struct DomainFilter {
    blocked: Vec<String>,
}

impl DomainFilter {
    pub fn new<I, S>(blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked: blocked
                .into_iter()
                .map(|s| s.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// True when the URL's host contains any deny-list entry. Pure and total:
    /// URLs without a parseable host are not blocked (they fail at fetch time
    /// instead).
    pub fn is_blocked(&self, url: &str) -> bool {
        let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_owned)) {
            Some(h) => h.to_ascii_lowercase(),
            None => return false,
        };
        self.blocked.iter().any(|bad| host.contains(bad.as_str()))
    }
}
