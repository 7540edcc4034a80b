//! Logical path <-> store key translation.
//!
//! The codec strips one leading `/` and prepends the namespace prefix
//! when one is configured. Segment boundaries are exactly `/`; there is
//! no escaping, so a segment cannot itself contain a slash.

/// Bidirectional path/key mapping for one namespace.
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    /// `prefix` is normalized: surrounding slashes are trimmed, empty
    /// means no namespacing.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn encode(&self, path: &str) -> String {
        let rest = path.strip_prefix('/').unwrap_or(path);
        if self.prefix.is_empty() {
            rest.to_string()
        } else {
            format!("{}/{}", self.prefix, rest)
        }
    }

    /// Strips exactly `<prefix>/`. Keys outside the namespace come back
    /// unchanged; that only happens when a shared bucket holds foreign
    /// keys and a caller decodes one directly.
    pub fn decode<'a>(&self, key: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            return key;
        }
        match key
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(rest) => rest,
            None => key,
        }
    }
}
