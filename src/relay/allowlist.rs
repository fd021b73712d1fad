//! Country calling-code allow-list

/// Prefix membership check over a fixed configured set.
///
/// An empty set disables the check entirely, for deployments that accept
/// traffic from any calling code.
#[derive(Debug, Clone)]
pub struct CountryAllowList {
    prefixes: Vec<String>,
}

impl CountryAllowList {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    pub fn is_enabled(&self) -> bool {
        !self.prefixes.is_empty()
    }

    /// True when the identity starts with an allow-listed calling code
    pub fn permits(&self, identity: &str) -> bool {
        if self.prefixes.is_empty() {
            return true;
        }
        self.prefixes.iter().any(|prefix| identity.starts_with(prefix))
    }
}
