use serde::Deserialize;

/// One source record, keyed by the weather-history CSV headers.
/// Columns not listed here are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Formatted Date", default)]
    pub formatted_date: Option<String>,
    #[serde(rename = "Temperature (C)", default)]
    pub temperature: Option<String>,
    #[serde(rename = "Humidity", default)]
    pub humidity: Option<String>,
    #[serde(rename = "Apparent Temperature (C)", default)]
    pub apparent_temperature: Option<String>,
}
