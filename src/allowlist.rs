use std::collections::HashSet;
use url::Url;

/// Fixed set of destination hosts the relay may forward to.
///
/// Built once at startup from configuration and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct HostAllowlist {
    hosts: HashSet<String>,
}

impl HostAllowlist {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Check a destination URL.
    ///
    /// Returns the parsed host when allowed; otherwise the host text to report
    /// (empty when the URL has no host at all).
    pub fn check(&self, url: &str) -> Result<String, String> {
        match target_host(url) {
            Some(host) if self.contains(&host) => Ok(host),
            Some(host) => Err(host),
            None => Err(String::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Hosts in sorted order, for the startup log
    pub fn sorted(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.hosts.iter().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }
}

/// Host component of an http(s) destination URL, if it parses and has one
pub fn target_host(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str().map(str::to_string)
}
