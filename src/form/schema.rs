//! Static form schema: which fields exist, how they render, and which are editable.

use std::fmt;

/// Numeric configuration fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericField {
    DnsConcurrency,
    LatencyTestConcurrency,
    SpeedtestConcurrency,
    MaxLatency,
    SpeedtestRateLimitMb,
    MinSpeed,
    TopNPerGroup,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        Self::DnsConcurrency,
        Self::LatencyTestConcurrency,
        Self::SpeedtestConcurrency,
        Self::MaxLatency,
        Self::SpeedtestRateLimitMb,
        Self::MinSpeed,
        Self::TopNPerGroup,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::DnsConcurrency => "dns_concurrency",
            Self::LatencyTestConcurrency => "latency_test_concurrency",
            Self::SpeedtestConcurrency => "speedtest_concurrency",
            Self::MaxLatency => "max_latency",
            Self::SpeedtestRateLimitMb => "speedtest_rate_limit_mb",
            Self::MinSpeed => "min_speed",
            Self::TopNPerGroup => "top_n_per_group",
        }
    }

    /// The concurrency knobs are displayed but never edited from the form.
    pub fn is_editable(&self) -> bool {
        !matches!(
            self,
            Self::DnsConcurrency | Self::LatencyTestConcurrency | Self::SpeedtestConcurrency
        )
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Every field the form binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Numeric(NumericField),
    IpVersion,
    GroupBy,
    FilterRegions,
    FilterColos,
}

impl FieldId {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Numeric(n) => n.key(),
            Self::IpVersion => "ip_version",
            Self::GroupBy => "group_by",
            Self::FilterRegions => "filter_regions",
            Self::FilterColos => "filter_colos",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FORM_SCHEMA.iter().map(|spec| spec.id).find(|id| id.key() == key)
    }

    pub fn spec(&self) -> &'static FieldSpec {
        match self {
            Self::Numeric(NumericField::DnsConcurrency) => &DNS_CONCURRENCY,
            Self::Numeric(NumericField::LatencyTestConcurrency) => &LATENCY_TEST_CONCURRENCY,
            Self::Numeric(NumericField::SpeedtestConcurrency) => &SPEEDTEST_CONCURRENCY,
            Self::Numeric(NumericField::MaxLatency) => &MAX_LATENCY,
            Self::Numeric(NumericField::SpeedtestRateLimitMb) => &SPEEDTEST_RATE_LIMIT_MB,
            Self::Numeric(NumericField::MinSpeed) => &MIN_SPEED,
            Self::Numeric(NumericField::TopNPerGroup) => &TOP_N_PER_GROUP,
            Self::IpVersion => &IP_VERSION,
            Self::GroupBy => &GROUP_BY,
            Self::FilterRegions => &FILTER_REGIONS,
            Self::FilterColos => &FILTER_COLOS,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A selectable value for a select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number { editable: bool },
    Select { choices: &'static [Choice] },
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: FieldId,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_editable(&self) -> bool {
        !matches!(self.kind, FieldKind::Number { editable: false })
    }
}

pub const IP_VERSION_CHOICES: &[Choice] = &[
    Choice { value: "ipv4", text: "IPv4" },
    Choice { value: "ipv6", text: "IPv6" },
];

pub const GROUP_BY_CHOICES: &[Choice] = &[
    Choice { value: "region", text: "By region" },
    Choice { value: "colo", text: "By data center" },
];

const DNS_CONCURRENCY: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::DnsConcurrency),
    label: "DNS concurrency",
    kind: FieldKind::Number { editable: false },
};

const LATENCY_TEST_CONCURRENCY: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::LatencyTestConcurrency),
    label: "Latency test concurrency",
    kind: FieldKind::Number { editable: false },
};

const SPEEDTEST_CONCURRENCY: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::SpeedtestConcurrency),
    label: "Speed test concurrency",
    kind: FieldKind::Number { editable: false },
};

const MAX_LATENCY: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::MaxLatency),
    label: "Max latency (ms)",
    kind: FieldKind::Number { editable: true },
};

const SPEEDTEST_RATE_LIMIT_MB: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::SpeedtestRateLimitMb),
    label: "Speed cap (MB/s, 0 = unlimited)",
    kind: FieldKind::Number { editable: true },
};

const MIN_SPEED: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::MinSpeed),
    label: "Minimum speed (MB/s, 0 = no minimum)",
    kind: FieldKind::Number { editable: true },
};

const IP_VERSION: FieldSpec = FieldSpec {
    id: FieldId::IpVersion,
    label: "IP version",
    kind: FieldKind::Select { choices: IP_VERSION_CHOICES },
};

const GROUP_BY: FieldSpec = FieldSpec {
    id: FieldId::GroupBy,
    label: "Group by",
    kind: FieldKind::Select { choices: GROUP_BY_CHOICES },
};

const FILTER_REGIONS: FieldSpec = FieldSpec {
    id: FieldId::FilterRegions,
    label: "Regions (none selected = all)",
    kind: FieldKind::Tags,
};

const FILTER_COLOS: FieldSpec = FieldSpec {
    id: FieldId::FilterColos,
    label: "Data centers (none selected = all)",
    kind: FieldKind::Tags,
};

const TOP_N_PER_GROUP: FieldSpec = FieldSpec {
    id: FieldId::Numeric(NumericField::TopNPerGroup),
    label: "Top IPs per group",
    kind: FieldKind::Number { editable: true },
};

/// Display order: read-only group first, then the editable fields.
pub const FORM_SCHEMA: &[FieldSpec] = &[
    DNS_CONCURRENCY,
    LATENCY_TEST_CONCURRENCY,
    SPEEDTEST_CONCURRENCY,
    MAX_LATENCY,
    SPEEDTEST_RATE_LIMIT_MB,
    MIN_SPEED,
    IP_VERSION,
    GROUP_BY,
    FILTER_REGIONS,
    FILTER_COLOS,
    TOP_N_PER_GROUP,
];
