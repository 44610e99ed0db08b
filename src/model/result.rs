use serde::Deserialize;

/// One ranked IP from a finished run.
///
/// Accepts both the documented camelCase names and the engine's native
/// PascalCase names; unknown fields (source domain, loss rate) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRow {
    #[serde(alias = "Address")]
    pub address: String,
    #[serde(rename = "delayNanoseconds", alias = "Delay")]
    pub delay_nanoseconds: i64,
    #[serde(rename = "downloadSpeedKBps", alias = "DownloadSpeed")]
    pub download_speed_kbps: f64,
    #[serde(alias = "Colo", default)]
    pub colo: String,
    #[serde(alias = "Region", default)]
    pub region: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_documented_names() {
        let row: ResultRow = serde_json::from_value(json!({
            "address": "1.2.3.4",
            "delayNanoseconds": 12000000,
            "downloadSpeedKBps": 10240,
            "colo": "LAX",
            "region": "NA"
        }))
        .unwrap();
        assert_eq!(row.delay_nanoseconds, 12_000_000);
        assert_eq!(row.download_speed_kbps, 10240.0);
    }

    #[test]
    fn test_engine_native_names() {
        let row: ResultRow = serde_json::from_value(json!({
            "Address": "104.16.1.1",
            "SourceDomain": "example.com",
            "Delay": 85000000,
            "LossRate": 0,
            "Colo": "SJC",
            "Region": "North America",
            "DownloadSpeed": 2048
        }))
        .unwrap();
        assert_eq!(row.address, "104.16.1.1");
        assert_eq!(row.colo, "SJC");
        assert_eq!(row.region, "North America");
    }
}
