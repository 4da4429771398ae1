//! Reusable text buffer.

use std::fmt;

/// Mutable UTF-8 text whose allocation is kept across reads.
///
/// Orders and compares byte-wise, like every other text value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Utf8 {
    text: String,
}

impl Utf8 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Replace the content, reusing the existing allocation.
    pub fn set(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl From<&str> for Utf8 {
    fn from(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

impl From<String> for Utf8 {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl fmt::Display for Utf8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reuses_buffer() {
        let mut text = Utf8::from("a longer piece of text");
        let before = text.text.capacity();
        text.set("short");
        assert_eq!(text.as_str(), "short");
        assert_eq!(text.text.capacity(), before);
    }

    #[test]
    fn test_orders_bytewise() {
        assert!(Utf8::from("B") < Utf8::from("a"));
        assert!(Utf8::from("ab") > Utf8::from("a"));
    }
}
