//! Identifier generation
//!
//! Every entity (book, page, question, media, response) gets a random
//! UUID v4 rendered as hyphenated text. IDs are kept as plain strings so
//! books written by other tools, with IDs in other shapes, still load.

use uuid::Uuid;

/// Generate a new unique identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shorten an ID for display (first 8 characters)
pub fn short(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_is_uuid() {
        let id = new_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn test_new_id_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_short() {
        assert_eq!(short("0123456789abcdef"), "01234567");
        assert_eq!(short("abc"), "abc");
    }
}
