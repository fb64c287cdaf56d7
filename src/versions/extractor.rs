//! Version occurrence scanning inside client identifiers
//!
//! A client identifier may embed several SDK identifiers, e.g. a React
//! wrapper that reports the JavaScript client it bundles:
//! `stream-chat-react-12.13.1-stream-chat-js-v8.57.6-browser`.
//! Every `name, [-_], [v], X.Y.Z, [-suffix]` occurrence is returned.

use regex::Regex;
use std::sync::LazyLock;

use super::Version;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<name>.*?)[-_]?v?(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)(?:-(?P<suffix>[a-z]+))?",
    )
    .expect("version pattern compiles")
});

/// One version occurrence found in a client identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMatch {
    /// Text preceding the version, with any suffix tag appended
    pub fragment: String,
    pub version: Version,
}

/// Find every version occurrence in a client identifier, left to right
///
/// The fragment of each match starts where the previous match ended. A
/// trailing lowercase suffix tag (`-browser`, `-node`) is appended to the
/// fragment so it takes part in classification.
pub fn extract_all(client: &str) -> Vec<VersionMatch> {
    VERSION_PATTERN
        .captures_iter(client)
        .filter_map(|caps| {
            let version = Version::new(
                caps.name("major")?.as_str().parse().ok()?,
                caps.name("minor")?.as_str().parse().ok()?,
                caps.name("patch")?.as_str().parse().ok()?,
            );

            let mut fragment = caps
                .name("name")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            if let Some(suffix) = caps.name("suffix") {
                fragment.push('-');
                fragment.push_str(suffix.as_str());
            }

            Some(VersionMatch { fragment, version })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_version() {
        let matches = extract_all("stream-java-client-1.29.0");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].fragment, "stream-java-client");
        assert_eq!(matches[0].version, Version::new(1, 29, 0));
    }

    #[test]
    fn test_v_prefix_and_suffix_tag() {
        let matches = extract_all("stream-chat-js-v8.57.6-node");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].fragment, "stream-chat-js-node");
        assert_eq!(matches[0].version, Version::new(8, 57, 6));
    }

    #[test]
    fn test_wrapper_embeds_inner_sdk() {
        let matches = extract_all("stream-chat-react-12.13.1-stream-chat-js-v8.57.6-browser");
        assert_eq!(matches.len(), 2);
        assert!(matches[0].fragment.starts_with("stream-chat-react"));
        assert_eq!(matches[0].version, Version::new(12, 13, 1));
        assert!(matches[1].fragment.ends_with("-browser"));
        assert_eq!(matches[1].version, Version::new(8, 57, 6));
    }

    #[test]
    fn test_underscore_separator() {
        let matches = extract_all("sdk_python_4.1.0");
        assert_eq!(matches[0].fragment, "sdk_python");
        assert_eq!(matches[0].version, Version::new(4, 1, 0));
    }

    #[test]
    fn test_metadata_versions_are_returned_too() {
        let matches =
            extract_all("stream-chat-uikit-client-v4.22.0|app=Shop|app_version=9.28.1|os=iOS 18.5");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].fragment, "stream-chat-uikit-client");
        assert_eq!(matches[1].fragment, "|app=Shop|app_version=");
    }

    #[test]
    fn test_no_version() {
        assert!(extract_all("invalid-client-string").is_empty());
        assert!(extract_all("").is_empty());
        assert!(extract_all("release 1.2").is_empty());
    }

    #[test]
    fn test_oversized_component_is_not_a_version() {
        assert!(extract_all("sdk-99999999999999999999999.1.1").is_empty());
    }
}
