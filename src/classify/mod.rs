//! Client identity classification
//!
//! Maps the free-text client identifier of a log row onto one canonical
//! SDK/platform category. Classification walks [`RULES`] top to bottom and
//! stops at the first rule whose needle occurs in the lowercased input.
//! Categories overlap lexically ("react" inside "react-native", "java"
//! inside "javascript"), so the order of the list decides the result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical SDK/platform category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClientCategory {
    #[serde(rename = "React Native")]
    ReactNative,
    #[serde(rename = "React")]
    React,
    #[serde(rename = "client-js-browser")]
    JsBrowser,
    #[serde(rename = "client-js-node")]
    JsNode,
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "Android")]
    Android,
    #[serde(rename = "Python SDK")]
    Python,
    #[serde(rename = "Java SDK")]
    Java,
    #[serde(rename = "PHP SDK")]
    Php,
    #[serde(rename = "Ruby SDK")]
    Ruby,
    #[serde(rename = "Go SDK")]
    Go,
    #[serde(rename = ".NET SDK")]
    DotNet,
    #[serde(rename = "Flutter")]
    Flutter,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl ClientCategory {
    /// Every category, in declaration order
    pub const ALL: [ClientCategory; 15] = [
        ClientCategory::ReactNative,
        ClientCategory::React,
        ClientCategory::JsBrowser,
        ClientCategory::JsNode,
        ClientCategory::Ios,
        ClientCategory::Android,
        ClientCategory::Python,
        ClientCategory::Java,
        ClientCategory::Php,
        ClientCategory::Ruby,
        ClientCategory::Go,
        ClientCategory::DotNet,
        ClientCategory::Flutter,
        ClientCategory::Other,
        ClientCategory::Unknown,
    ];

    /// Display label, identical to the serialized form
    pub fn label(self) -> &'static str {
        match self {
            ClientCategory::ReactNative => "React Native",
            ClientCategory::React => "React",
            ClientCategory::JsBrowser => "client-js-browser",
            ClientCategory::JsNode => "client-js-node",
            ClientCategory::Ios => "iOS",
            ClientCategory::Android => "Android",
            ClientCategory::Python => "Python SDK",
            ClientCategory::Java => "Java SDK",
            ClientCategory::Php => "PHP SDK",
            ClientCategory::Ruby => "Ruby SDK",
            ClientCategory::Go => "Go SDK",
            ClientCategory::DotNet => ".NET SDK",
            ClientCategory::Flutter => "Flutter",
            ClientCategory::Other => "Other",
            ClientCategory::Unknown => "Unknown",
        }
    }

    /// Whether the category names a concrete SDK or platform
    pub fn is_identified(self) -> bool {
        !matches!(self, ClientCategory::Other | ClientCategory::Unknown)
    }
}

impl fmt::Display for ClientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classification rule: any needle present selects the category
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub needles: &'static [&'static str],
    pub category: ClientCategory,
}

impl ClassificationRule {
    fn matches(&self, lowered: &str) -> bool {
        self.needles.iter().any(|needle| lowered.contains(needle))
    }
}

/// Classification rules in precedence order
///
/// Needles are lowercase. "flutter " keeps its trailing space.
pub const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        needles: &["react-native"],
        category: ClientCategory::ReactNative,
    },
    ClassificationRule {
        needles: &["react"],
        category: ClientCategory::React,
    },
    ClassificationRule {
        needles: &["browser"],
        category: ClientCategory::JsBrowser,
    },
    ClassificationRule {
        needles: &["node"],
        category: ClientCategory::JsNode,
    },
    ClassificationRule {
        needles: &["ios", "uikit"],
        category: ClientCategory::Ios,
    },
    ClassificationRule {
        needles: &["android"],
        category: ClientCategory::Android,
    },
    ClassificationRule {
        needles: &["python"],
        category: ClientCategory::Python,
    },
    ClassificationRule {
        needles: &["java"],
        category: ClientCategory::Java,
    },
    ClassificationRule {
        needles: &["php"],
        category: ClientCategory::Php,
    },
    ClassificationRule {
        needles: &["ruby"],
        category: ClientCategory::Ruby,
    },
    ClassificationRule {
        needles: &["go"],
        category: ClientCategory::Go,
    },
    ClassificationRule {
        needles: &["dotnet"],
        category: ClientCategory::DotNet,
    },
    ClassificationRule {
        needles: &["flutter "],
        category: ClientCategory::Flutter,
    },
];

/// Classify a client identifier
///
/// Total: blank or absent input is [`ClientCategory::Unknown`], input no
/// rule matches is [`ClientCategory::Other`].
pub fn classify(client: Option<&str>) -> ClientCategory {
    let Some(client) = client.filter(|c| !c.is_empty()) else {
        return ClientCategory::Unknown;
    };

    let lowered = client.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.category)
        .unwrap_or(ClientCategory::Other)
}
