//! Upstream origin whitelist
//! A target URL is proxyable only if it starts with one of the entries

/// Origins the dashboard is allowed to reach through the proxy
pub const DEFAULT_WHITELIST: &[&str] = &[
    "https://api.coingecko.com",
    "https://api.llama.fi",
    "https://api.etherscan.io",
    "https://api.routescan.io",
];

/// Ordered set of allowed origin prefixes, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct Whitelist {
    entries: Vec<String>,
}

impl Whitelist {
    /// Create a whitelist from the given prefixes
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Literal prefix comparison. No URL parsing, no wildcards.
    pub fn allows(&self, target: &str) -> bool {
        self.entries.iter().any(|prefix| target.starts_with(prefix.as_str()))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::new(DEFAULT_WHITELIST.iter().copied())
    }
}
