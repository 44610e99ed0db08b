//! Typed models for the run configuration, the location catalog and result rows.

pub mod catalog;
pub mod result;

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use catalog::{CatalogEntry, LocationCatalog};
pub use result::ResultRow;

/// IP family the remote engine tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpVersion {
    #[default]
    #[serde(rename = "ipv4", alias = "")]
    Ipv4,
    #[serde(rename = "ipv6")]
    Ipv6,
}

impl IpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            _ => None,
        }
    }
}

/// How the remote engine groups candidates before picking the top N.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    #[default]
    #[serde(rename = "region", alias = "")]
    Region,
    #[serde(rename = "colo")]
    Colo,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Colo => "colo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "region" => Some(Self::Region),
            "colo" => Some(Self::Colo),
            _ => None,
        }
    }
}

/// Run configuration as exchanged with `/api/config` and sent on the run channel.
///
/// The three concurrency fields are read-only here: they are decoded for
/// display but never serialized back, so the remote side keeps its own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing)]
    pub dns_concurrency: f64,
    #[serde(default, skip_serializing)]
    pub latency_test_concurrency: f64,
    #[serde(default, skip_serializing)]
    pub speedtest_concurrency: f64,

    /// Milliseconds.
    #[serde(default, serialize_with = "wire_number")]
    pub max_latency: f64,
    /// MB/s, `0` means unlimited.
    #[serde(default, serialize_with = "wire_number")]
    pub speedtest_rate_limit_mb: f64,
    /// MB/s, `0` means no lower bound.
    #[serde(default, serialize_with = "wire_number")]
    pub min_speed: f64,
    #[serde(default, serialize_with = "wire_number")]
    pub top_n_per_group: f64,

    #[serde(default)]
    pub ip_version: IpVersion,
    #[serde(default)]
    pub group_by: GroupBy,

    /// Empty means "all regions".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filter_regions: BTreeSet<String>,
    /// Empty means "all colos".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filter_colos: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dns_concurrency: 0.0,
            latency_test_concurrency: 0.0,
            speedtest_concurrency: 0.0,
            max_latency: 0.0,
            speedtest_rate_limit_mb: 0.0,
            min_speed: 0.0,
            top_n_per_group: 0.0,
            ip_version: IpVersion::Ipv4,
            group_by: GroupBy::Region,
            filter_regions: BTreeSet::new(),
            filter_colos: BTreeSet::new(),
        }
    }
}

/// Whole values go out as JSON integers; the engine stores several of these as ints.
fn wire_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}
