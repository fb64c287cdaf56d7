//! SDK version discovery
//!
//! This module provides:
//! - [`Version`], a numeric `major.minor.patch` triple
//! - [`extract_all`], which finds every version occurrence in a client string
//! - [`LatestVersions`], the per-category maximum across a dataset
//!
//! The reduction to latest versions is associative and commutative, so
//! partial results from disjoint shards combine with [`LatestVersions::merge`].

mod extractor;

pub use extractor::{extract_all, VersionMatch};

use crate::classify::{classify, ClientCategory};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Semantic version triple, ordered numerically by major, minor, patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().trim_start_matches('v').split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(format!("expected major.minor.patch, got '{}'", s));
        };
        let num = |p: &str| {
            p.parse::<u64>()
                .map_err(|e| format!("invalid version component '{}': {}", p, e))
        };
        Ok(Self::new(num(*major)?, num(*minor)?, num(*patch)?))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A classified version occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTag {
    pub category: ClientCategory,
    pub version: Version,
}

/// Classify every version occurrence of a client string
///
/// Occurrences whose fragment classifies as `Other` or `Unknown` carry no
/// SDK identity and are dropped.
pub fn tags(client: &str) -> Vec<VersionTag> {
    extract_all(client)
        .into_iter()
        .filter_map(|m| {
            let category = classify(Some(&m.fragment));
            category.is_identified().then_some(VersionTag {
                category,
                version: m.version,
            })
        })
        .collect()
}

/// Latest version seen per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatestVersions {
    versions: BTreeMap<ClientCategory, Version>,
}

impl LatestVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tag, keeping the greater version
    pub fn observe(&mut self, tag: VersionTag) {
        self.versions
            .entry(tag.category)
            .and_modify(|current| {
                if tag.version > *current {
                    *current = tag.version;
                }
            })
            .or_insert(tag.version);
    }

    /// Record every version a client string carries
    pub fn observe_client(&mut self, client: &str) {
        for tag in tags(client) {
            self.observe(tag);
        }
    }

    /// Combine with a partial result from another shard
    pub fn merge(mut self, other: Self) -> Self {
        for (category, version) in other.versions {
            self.observe(VersionTag { category, version });
        }
        self
    }

    pub fn get(&self, category: ClientCategory) -> Option<Version> {
        self.versions.get(&category).copied()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientCategory, Version)> + '_ {
        self.versions.iter().map(|(c, v)| (*c, *v))
    }
}

/// Reduce a dataset's client strings to the latest version per category
pub fn reduce_latest<I, S>(clients: I) -> LatestVersions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    clients
        .into_iter()
        .fold(LatestVersions::new(), |mut latest, client| {
            latest.observe_client(client.as_ref());
            latest
        })
}
