//! Catalog — one compiled matcher per [`FieldKind`].
//!
//! Matching runs on the ripgrep engine over the UTF-8 bytes of the
//! content. Spans returned here are byte ranges into that content.

use std::ops::Range;

use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};

use crate::error::{FetchError, FetchResult};
use crate::model::FieldKind;

/// Raw rule text for every field kind.
pub struct Rules;

impl Rules {
    /// `yyyy-mm-dd hh:mm:ss?ffff`. The fraction separator is any character.
    pub const TIMESTAMP: &'static str = r"\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}.\d{4}";

    /// First raw occurrence of a level token, no word boundaries.
    pub const LOG_LEVEL: &'static str = r"(TRACE|DEBUG|INFO|NOTICE|WARN|WARNING|ERROR|SEVERE|FATAL)";

    /// Bracketed token whose last inner character is not a digit.
    pub const CLASS_NAME: &'static str = r"\[[^\]]*\D\]";

    /// A single digit.
    pub const THREAD_ID: &'static str = r"\d";

    pub fn for_kind(kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Timestamp => Self::TIMESTAMP,
            FieldKind::LogLevel => Self::LOG_LEVEL,
            FieldKind::ClassName => Self::CLASS_NAME,
            FieldKind::ThreadId => Self::THREAD_ID,
        }
    }
}

/// Compiled matchers for all field kinds. Immutable once built.
pub struct PatternCatalog {
    timestamp: RegexMatcher,
    log_level: RegexMatcher,
    class_name: RegexMatcher,
    thread_id: RegexMatcher,
}

impl PatternCatalog {
    pub fn new() -> FetchResult<Self> {
        Ok(Self {
            timestamp: compile(FieldKind::Timestamp)?,
            log_level: compile(FieldKind::LogLevel)?,
            class_name: compile(FieldKind::ClassName)?,
            thread_id: compile(FieldKind::ThreadId)?,
        })
    }

    fn matcher(&self, kind: FieldKind) -> &RegexMatcher {
        match kind {
            FieldKind::Timestamp => &self.timestamp,
            FieldKind::LogLevel => &self.log_level,
            FieldKind::ClassName => &self.class_name,
            FieldKind::ThreadId => &self.thread_id,
        }
    }

    // `RegexMatcher`'s error type is `NoError`: searching never fails, so the
    // `Err` arms below are unreachable.

    /// Leftmost match of `kind` in `haystack`.
    pub fn first(&self, kind: FieldKind, haystack: &str) -> Option<Range<usize>> {
        match self.matcher(kind).find(haystack.as_bytes()) {
            Ok(found) => found.map(|m| m.start()..m.end()),
            Err(_) => None,
        }
    }

    /// Every non-overlapping match of `kind`, left to right.
    pub fn all(&self, kind: FieldKind, haystack: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let searched = self.matcher(kind).find_iter(haystack.as_bytes(), |m| {
            spans.push(m.start()..m.end());
            true
        });
        match searched {
            Ok(()) => spans,
            Err(_) => Vec::new(),
        }
    }
}

fn compile(kind: FieldKind) -> FetchResult<RegexMatcher> {
    RegexMatcherBuilder::new()
        .case_insensitive(false)
        .multi_line(false)
        .build(Rules::for_kind(kind))
        .map_err(|e| FetchError::Pattern(format!("{} rule: {}", kind, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PatternCatalog {
        PatternCatalog::new().unwrap()
    }

    fn first_text<'a>(kind: FieldKind, haystack: &'a str) -> Option<&'a str> {
        catalog().first(kind, haystack).map(|span| &haystack[span])
    }

    // ─── Timestamp ──────────────────────────────────────────────

    #[test]
    fn test_timestamp_with_dot_fraction() {
        assert_eq!(
            first_text(FieldKind::Timestamp, "x 2024-01-01 10:00:00.1234 INFO"),
            Some("2024-01-01 10:00:00.1234")
        );
    }

    #[test]
    fn test_timestamp_fraction_separator_is_any_char() {
        assert_eq!(
            first_text(FieldKind::Timestamp, "2024-01-01 10:00:00,5678"),
            Some("2024-01-01 10:00:00,5678")
        );
        assert_eq!(
            first_text(FieldKind::Timestamp, "2024-01-01\t10:00:00:0001"),
            Some("2024-01-01\t10:00:00:0001")
        );
    }

    #[test]
    fn test_timestamp_requires_four_fraction_digits() {
        assert_eq!(first_text(FieldKind::Timestamp, "2024-01-01 10:00:00.123 INFO"), None);
        assert_eq!(first_text(FieldKind::Timestamp, "2024-01-01T10:00:00.1234"), None);
    }

    #[test]
    fn test_timestamp_all_is_non_overlapping_in_order() {
        let text = "2024-01-01 10:00:00.0001 a\n2024-01-01 10:00:01.0002 b\n";
        let spans = catalog().all(FieldKind::Timestamp, text);
        assert_eq!(spans.len(), 2);
        assert_eq!(&text[spans[0].clone()], "2024-01-01 10:00:00.0001");
        assert_eq!(&text[spans[1].clone()], "2024-01-01 10:00:01.0002");
        assert!(spans[0].end <= spans[1].start);
    }

    // ─── LogLevel ───────────────────────────────────────────────

    #[test]
    fn test_level_leftmost_token_wins() {
        assert_eq!(first_text(FieldKind::LogLevel, "ERROR then INFO"), Some("ERROR"));
        assert_eq!(first_text(FieldKind::LogLevel, "x WARNING y"), Some("WARN"));
    }

    #[test]
    fn test_level_is_not_word_bounded() {
        assert_eq!(first_text(FieldKind::LogLevel, "MYINFOX"), Some("INFO"));
    }

    #[test]
    fn test_level_is_case_sensitive() {
        assert_eq!(first_text(FieldKind::LogLevel, "info warn error"), None);
    }

    // ─── ClassName ──────────────────────────────────────────────

    #[test]
    fn test_class_name_bracketed_token() {
        assert_eq!(
            first_text(FieldKind::ClassName, "INFO [com.app.Main] msg"),
            Some("[com.app.Main]")
        );
    }

    #[test]
    fn test_class_name_skips_numeric_brackets() {
        assert_eq!(
            first_text(FieldKind::ClassName, "[42] INFO [Worker] go"),
            Some("[Worker]")
        );
    }

    #[test]
    fn test_class_name_none_without_brackets() {
        assert_eq!(first_text(FieldKind::ClassName, "plain text 123"), None);
    }

    // ─── ThreadId ───────────────────────────────────────────────

    #[test]
    fn test_thread_id_is_single_digit() {
        assert_eq!(first_text(FieldKind::ThreadId, "thread-17"), Some("1"));
        assert_eq!(first_text(FieldKind::ThreadId, "no digits"), None);
    }

    #[test]
    fn test_empty_haystack_has_no_matches() {
        let catalog = catalog();
        for kind in FieldKind::ALL {
            assert_eq!(catalog.first(kind, ""), None);
            assert!(catalog.all(kind, "").is_empty());
        }
    }

    #[test]
    fn test_all_thread_ids_are_every_digit() {
        let spans = catalog().all(FieldKind::ThreadId, "t1 t22");
        assert_eq!(spans, vec![1..2, 4..5, 5..6]);
    }

    #[test]
    fn test_rules_cover_every_kind() {
        for kind in FieldKind::ALL {
            assert!(!Rules::for_kind(kind).is_empty());
        }
    }
}
