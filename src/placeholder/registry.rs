//! Process-wide registry of placeholder handlers.
//!
//! The registry is built exactly once on first use and is read-only
//! afterwards, so concurrent lookups from any number of evaluator instances
//! need no locking.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use super::handlers::{
    IgnorePlaceholderHandler, IsDateTimePlaceholderHandler, IsNullPlaceholderHandler,
    IsNumberPlaceholderHandler, MatchesRegexPlaceholderHandler, PlaceholderHandler,
};

static KNOWN_HANDLERS: OnceLock<FxHashMap<String, Box<dyn PlaceholderHandler>>> = OnceLock::new();

/// All handler implementations known to this build.
fn discover() -> Vec<Box<dyn PlaceholderHandler>> {
    vec![
        Box::new(IgnorePlaceholderHandler),
        Box::new(IsNullPlaceholderHandler),
        Box::new(IsNumberPlaceholderHandler),
        Box::new(IsDateTimePlaceholderHandler),
        Box::new(MatchesRegexPlaceholderHandler),
    ]
}

fn known_handlers() -> &'static FxHashMap<String, Box<dyn PlaceholderHandler>> {
    KNOWN_HANDLERS.get_or_init(|| {
        let mut map = FxHashMap::default();
        // on duplicate keywords the later registration wins
        for handler in discover() {
            map.insert(handler.keyword().to_string(), handler);
        }
        map
    })
}

/// Looks up the handler registered for a keyword.
pub fn lookup(keyword: &str) -> Option<&'static dyn PlaceholderHandler> {
    known_handlers().get(keyword).map(|h| &**h)
}

/// Returns true if a handler is registered for the keyword.
pub fn is_known(keyword: &str) -> bool {
    known_handlers().contains_key(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keywords_registered() {
        for keyword in ["ignore", "isNull", "isNumber", "isDateTime", "matchesRegex"] {
            assert!(is_known(keyword), "missing handler for {}", keyword);
            let handler = lookup(keyword).unwrap();
            assert_eq!(handler.keyword(), keyword);
        }
    }

    #[test]
    fn test_unknown_keyword() {
        assert!(!is_known("noSuchKeyword"));
        assert!(lookup("noSuchKeyword").is_none());
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(!is_known("isnull"));
        assert!(!is_known("IGNORE"));
    }
}
