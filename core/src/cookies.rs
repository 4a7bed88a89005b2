//! Session cookie store replayed on every request.
//!
//! # Design
//! Each entry keeps the literal `name=value` token from the last
//! `Set-Cookie` seen for that name. Attributes (`Path`, `Expires`, ...) are
//! dropped and never enforced. Entries keep first-seen order so the replayed
//! header is stable across calls.

use crate::http::HttpResponse;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `Set-Cookie` value. Returns the cookie name when the entry
    /// had one.
    pub fn store(&mut self, set_cookie: &str) -> Option<&str> {
        let token = set_cookie.split(';').next().unwrap_or_default().trim();
        let name = token.split('=').next().unwrap_or_default().trim();
        if name.is_empty() {
            return None;
        }

        let idx = match self.entries.iter().position(|(k, _)| k == name) {
            Some(idx) => {
                self.entries[idx].1 = token.to_string();
                idx
            }
            None => {
                self.entries.push((name.to_string(), token.to_string()));
                self.entries.len() - 1
            }
        };
        Some(self.entries[idx].0.as_str())
    }

    /// Merge every `Set-Cookie` header of `response`, in arrival order.
    pub fn store_from(&mut self, response: &HttpResponse) {
        for value in response.header_all("set-cookie") {
            self.store(value);
        }
    }

    /// The stored `name=value` token for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All stored tokens joined for a `Cookie` header, or `None` when empty.
    pub fn header_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let tokens: Vec<&str> = self.entries.iter().map(|(_, v)| v.as_str()).collect();
        Some(tokens.join("; "))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cookies(values: &[&str]) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: values
                .iter()
                .map(|v| ("Set-Cookie".to_string(), v.to_string()))
                .collect(),
            body: String::new(),
        }
    }

    #[test]
    fn last_write_wins_and_attributes_are_dropped() {
        let mut jar = CookieJar::new();
        jar.store_from(&with_cookies(&["a=1; Path=/", "a=2; Path=/x"]));
        assert_eq!(jar.get("a"), Some("a=2"));
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.header_value().as_deref(), Some("a=2"));
    }

    #[test]
    fn header_joins_in_first_seen_order() {
        let mut jar = CookieJar::new();
        jar.store("session=abc; HttpOnly");
        jar.store("theme=dark");
        jar.store("session=def");
        assert_eq!(jar.header_value().as_deref(), Some("session=def; theme=dark"));
    }

    #[test]
    fn response_without_set_cookie_leaves_jar_unchanged() {
        let mut jar = CookieJar::new();
        jar.store("a=1");
        let before = jar.clone();
        jar.store_from(&with_cookies(&[]));
        assert_eq!(jar, before);
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let mut jar = CookieJar::new();
        assert_eq!(jar.store("token=abc=="), Some("token"));
        assert_eq!(jar.get("token"), Some("token=abc=="));
    }

    #[test]
    fn nameless_entries_are_ignored() {
        let mut jar = CookieJar::new();
        assert_eq!(jar.store("=orphan; Path=/"), None);
        assert_eq!(jar.store(""), None);
        assert!(jar.is_empty());
        assert_eq!(jar.header_value(), None);
    }
}
