//! Raw candidate values as typed into the form, before they become a [`Config`].

use std::collections::{BTreeMap, BTreeSet};

use crate::form::schema::NumericField;
use crate::model::{Config, GroupBy, IpVersion};

/// A candidate configuration. Numeric fields keep their raw text so the
/// validator can tell "empty" from "not a number".
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub inputs: BTreeMap<NumericField, String>,
    pub ip_version: IpVersion,
    pub group_by: GroupBy,
    pub filter_regions: BTreeSet<String>,
    pub filter_colos: BTreeSet<String>,
}

impl Draft {
    pub fn input(&self, field: NumericField) -> &str {
        self.inputs.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Convert to a config. Empty or unparseable input reads as `0`; callers
    /// validate first.
    pub fn to_config(&self) -> Config {
        let n = |field| parse_or_zero(self.input(field));
        Config {
            dns_concurrency: n(NumericField::DnsConcurrency),
            latency_test_concurrency: n(NumericField::LatencyTestConcurrency),
            speedtest_concurrency: n(NumericField::SpeedtestConcurrency),
            max_latency: n(NumericField::MaxLatency),
            speedtest_rate_limit_mb: n(NumericField::SpeedtestRateLimitMb),
            min_speed: n(NumericField::MinSpeed),
            top_n_per_group: n(NumericField::TopNPerGroup),
            ip_version: self.ip_version,
            group_by: self.group_by,
            filter_regions: self.filter_regions.clone(),
            filter_colos: self.filter_colos.clone(),
        }
    }
}

impl From<&Config> for Draft {
    fn from(config: &Config) -> Self {
        let inputs = NumericField::ALL
            .into_iter()
            .map(|field| (field, numeric_value(config, field).to_string()))
            .collect();
        Self {
            inputs,
            ip_version: config.ip_version,
            group_by: config.group_by,
            filter_regions: config.filter_regions.clone(),
            filter_colos: config.filter_colos.clone(),
        }
    }
}

pub fn numeric_value(config: &Config, field: NumericField) -> f64 {
    match field {
        NumericField::DnsConcurrency => config.dns_concurrency,
        NumericField::LatencyTestConcurrency => config.latency_test_concurrency,
        NumericField::SpeedtestConcurrency => config.speedtest_concurrency,
        NumericField::MaxLatency => config.max_latency,
        NumericField::SpeedtestRateLimitMb => config.speedtest_rate_limit_mb,
        NumericField::MinSpeed => config.min_speed,
        NumericField::TopNPerGroup => config.top_n_per_group,
    }
}

/// Strict number parse: trimmed, finite.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_or_zero(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}
