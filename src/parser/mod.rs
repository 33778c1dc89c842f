//! Input classification for the download endpoint.
//!
//! Users paste either a full URL, a Bilibili BV id, or a bare id without the
//! `BV` marker. [`classify_input`] turns that text into a canonical fetch URL
//! with a prioritized rule chain; the first rule that matches wins:
//!
//! 1. general URL pattern → used verbatim
//! 2. exact BV id → `https://www.bilibili.com/video/<id>`
//! 3. `BV` + input is a BV id → same canonical URL
//! 4. input mentions `bilibili.com` anywhere → passed through verbatim
//!
//! Rule 4 is deliberately loose and may hand malformed URLs to the engine.
//!
//! # Example
//!
//! ```
//! use bili_downloader::parser::{classify_input, InputType};
//!
//! let target = classify_input("BV1xx411c7mD").unwrap();
//! assert_eq!(target.input_type, InputType::PlatformId);
//! assert_eq!(target.canonical_url, "https://www.bilibili.com/video/BV1xx411c7mD");
//! ```

mod error;
mod input;

pub use error::ClassifyError;
pub use input::{InputType, ResolvedTarget};

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Marker every BV id starts with.
pub const PLATFORM_ID_PREFIX: &str = "BV";

/// Domain substring accepted by the permissive fallback rule.
pub const PLATFORM_DOMAIN: &str = "bilibili.com";

/// Base of canonical video URLs built from BV ids.
pub const VIDEO_URL_BASE: &str = "https://www.bilibili.com/video/";

/// Optional scheme, dot-separated host labels, optional path.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+(/.*)?$")
        .expect("URL regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PLATFORM_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BV[a-zA-Z0-9]{10}$").expect("BV id regex is valid") // Static pattern, safe to panic
});

/// Returns true if `text` looks like a URL (scheme optional).
#[must_use]
pub fn is_url(text: &str) -> bool {
    URL_PATTERN.is_match(text)
}

/// Returns true if `text` is exactly a BV id.
#[must_use]
pub fn is_platform_id(text: &str) -> bool {
    PLATFORM_ID_PATTERN.is_match(text)
}

/// Builds the canonical video page URL for a BV id.
#[must_use]
pub fn video_url(platform_id: &str) -> String {
    format!("{VIDEO_URL_BASE}{platform_id}")
}

/// Classifies raw user input into a canonical fetch URL.
///
/// Leading and trailing whitespace is ignored.
///
/// # Errors
///
/// - [`ClassifyError::EmptyInput`] if the input is empty or whitespace-only
/// - [`ClassifyError::UnrecognizedInputFormat`] if no rule matches
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn classify_input(input: &str) -> Result<ResolvedTarget, ClassifyError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ClassifyError::EmptyInput);
    }

    let target = if is_url(text) {
        ResolvedTarget::passthrough(text, InputType::Url)
    } else if is_platform_id(text) {
        ResolvedTarget::new(text, InputType::PlatformId, video_url(text))
    } else if let Some(prefixed) = prefixed_platform_id(text) {
        ResolvedTarget::new(text, InputType::PrefixedId, video_url(&prefixed))
    } else if text.contains(PLATFORM_DOMAIN) {
        ResolvedTarget::passthrough(text, InputType::DomainFragment)
    } else {
        debug!(input = %text, "input matched no classification rule");
        return Err(ClassifyError::unrecognized(text));
    };

    debug!(kind = %target.input_type, url = %target.canonical_url, "input classified");
    Ok(target)
}

/// Prefixes the BV marker and returns the id if that yields a valid BV id.
fn prefixed_platform_id(text: &str) -> Option<String> {
    if text.starts_with(PLATFORM_ID_PREFIX) {
        return None;
    }
    let candidate = format!("{PLATFORM_ID_PREFIX}{text}");
    is_platform_id(&candidate).then_some(candidate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url_accepts_with_and_without_scheme() {
        assert!(is_url("https://www.bilibili.com/video/BV1xx411c7mD"));
        assert!(is_url("http://example.com"));
        assert!(is_url("www.bilibili.com/video/BV1xx411c7mD"));
        assert!(is_url("b23.tv/xyz"));
    }

    #[test]
    fn test_is_url_rejects_plain_words() {
        assert!(!is_url("BV1xx411c7mD"));
        assert!(!is_url("not a url"));
        assert!(!is_url("localhost"));
    }

    #[test]
    fn test_is_platform_id_exact_length() {
        assert!(is_platform_id("BV1xx411c7mD"));
        assert!(!is_platform_id("BV1xx411c7m"));
        assert!(!is_platform_id("BV1xx411c7mDD"));
        assert!(!is_platform_id("bv1xx411c7mD"));
        assert!(!is_platform_id("BV1xx411c7m!"));
    }

    #[test]
    fn test_classify_url_unchanged() {
        let url = "https://www.bilibili.com/video/BV1xx411c7mD?p=2";
        let target = classify_input(url).unwrap();
        assert_eq!(target.input_type, InputType::Url);
        assert_eq!(target.canonical_url, url);
    }

    #[test]
    fn test_classify_trims_whitespace() {
        let target = classify_input("  BV1xx411c7mD\n").unwrap();
        assert_eq!(
            target.canonical_url,
            "https://www.bilibili.com/video/BV1xx411c7mD"
        );
    }

    #[test]
    fn test_classify_bv_id() {
        let target = classify_input("BV1xx411c7mD").unwrap();
        assert_eq!(target.input_type, InputType::PlatformId);
        assert_eq!(
            target.canonical_url,
            "https://www.bilibili.com/video/BV1xx411c7mD"
        );
    }

    #[test]
    fn test_classify_bare_id_gets_prefix() {
        let target = classify_input("1xx411c7mD").unwrap();
        assert_eq!(target.input_type, InputType::PrefixedId);
        assert_eq!(target.raw, "1xx411c7mD");
        assert_eq!(
            target.canonical_url,
            "https://www.bilibili.com/video/BV1xx411c7mD"
        );
    }

    #[test]
    fn test_classify_numeric_string_is_accepted_after_prefix() {
        // Ten digits satisfy the id pattern once prefixed; this is a known false positive.
        let target = classify_input("1234567890").unwrap();
        assert_eq!(target.input_type, InputType::PrefixedId);
        assert_eq!(
            target.canonical_url,
            "https://www.bilibili.com/video/BV1234567890"
        );
    }

    #[test]
    fn test_classify_short_bv_is_not_prefixed_twice() {
        let err = classify_input("BVshort").unwrap_err();
        assert!(matches!(err, ClassifyError::UnrecognizedInputFormat { .. }));
    }

    #[test]
    fn test_classify_domain_fragment_passthrough() {
        let input = "see bilibili.com video please";
        let target = classify_input(input).unwrap();
        assert_eq!(target.input_type, InputType::DomainFragment);
        assert_eq!(target.canonical_url, input);
    }

    #[test]
    fn test_classify_empty_input() {
        assert_eq!(classify_input("").unwrap_err(), ClassifyError::EmptyInput);
        assert_eq!(
            classify_input(" \t\n ").unwrap_err(),
            ClassifyError::EmptyInput
        );
    }

    #[test]
    fn test_classify_unrecognized() {
        let err = classify_input("not a url or id!!").unwrap_err();
        assert_eq!(err, ClassifyError::unrecognized("not a url or id!!"));
    }
}
