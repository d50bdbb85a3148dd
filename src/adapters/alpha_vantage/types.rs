//! Alpha Vantage response types for TIME_SERIES_DAILY_ADJUSTED

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::PriceHistory;
use crate::ports::PriceHistoryError;

/// Amount of history to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Full 20+ year history
    #[default]
    Full,
    /// Latest 100 bars
    Compact,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Full => "full",
            OutputSize::Compact => "compact",
        }
    }
}

/// "Meta Data" block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaData {
    #[serde(rename = "1. Information", default)]
    pub information: String,
    #[serde(rename = "2. Symbol", default)]
    pub symbol: String,
    #[serde(rename = "3. Last Refreshed", default)]
    pub last_refreshed: String,
    #[serde(rename = "4. Output Size", default)]
    pub output_size: String,
    #[serde(rename = "5. Time Zone", default)]
    pub time_zone: String,
}

impl MetaData {
    /// Date part of "Last Refreshed" (the field may carry a time too)
    pub fn last_refreshed_date(&self) -> Option<NaiveDate> {
        let date = self.last_refreshed.get(..10)?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }
}

/// Top-level response body. On failure the provider returns 200 with one of
/// the message keys instead of a time series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyAdjustedResponse {
    #[serde(rename = "Meta Data", default)]
    pub meta_data: Option<MetaData>,
    #[serde(rename = "Time Series (Daily)", default)]
    pub time_series: Option<PriceHistory>,
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,
    #[serde(rename = "Note", default)]
    pub note: Option<String>,
    #[serde(rename = "Information", default)]
    pub information: Option<String>,
}

impl DailyAdjustedResponse {
    pub fn from_json(body: &str) -> Result<Self, PriceHistoryError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Extract the time series, mapping provider messages to errors
    pub fn into_history(self) -> Result<PriceHistory, PriceHistoryError> {
        if let Some(series) = self.time_series {
            if let Some(meta) = &self.meta_data {
                tracing::info!(
                    "Loaded {} daily bars for {} (last refreshed {})",
                    series.len(),
                    meta.symbol,
                    meta.last_refreshed_date()
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| meta.last_refreshed.clone())
                );
            }
            return Ok(series);
        }

        if let Some(message) = self.error_message {
            return Err(PriceHistoryError::Api(message));
        }
        if let Some(note) = self.note.or(self.information) {
            return Err(PriceHistoryError::RateLimited(note));
        }
        Err(PriceHistoryError::Api(
            "Response contained no daily time series".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Meta Data": {
            "1. Information": "Daily Time Series with Splits and Dividend Events",
            "2. Symbol": "GOOG",
            "3. Last Refreshed": "2024-01-04",
            "4. Output Size": "Full size",
            "5. Time Zone": "US/Eastern"
        },
        "Time Series (Daily)": {
            "2024-01-04": {
                "1. open": "99.0", "2. high": "103.0", "3. low": "98.0", "4. close": "102.0",
                "5. adjusted close": "102.0", "6. volume": "1000",
                "7. dividend amount": "0.0000", "8. split coefficient": "1.0"
            },
            "2024-01-02": {
                "1. open": "100.0", "2. high": "101.5", "3. low": "99.5", "4. close": "101.0",
                "5. adjusted close": "101.0", "6. volume": "1200",
                "7. dividend amount": "0.0000", "8. split coefficient": "1.0"
            }
        }
    }"#;

    #[test]
    fn test_parse_daily_adjusted() {
        let response = DailyAdjustedResponse::from_json(SAMPLE).unwrap();
        let meta = response.meta_data.clone().unwrap();
        assert_eq!(meta.symbol, "GOOG");
        assert_eq!(meta.last_refreshed_date(), NaiveDate::from_ymd_opt(2024, 1, 4));

        let history = response.into_history().unwrap();
        let dates: Vec<&String> = history.keys().collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-04"]);
        assert_eq!(history["2024-01-02"].open.as_deref(), Some("100.0"));
    }

    #[test]
    fn test_error_message_maps_to_api_error() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        let err = DailyAdjustedResponse::from_json(body).unwrap().into_history().unwrap_err();
        assert!(matches!(err, PriceHistoryError::Api(m) if m == "Invalid API call."));
    }

    #[test]
    fn test_note_maps_to_rate_limited() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = DailyAdjustedResponse::from_json(body).unwrap().into_history().unwrap_err();
        assert!(matches!(err, PriceHistoryError::RateLimited(_)));

        let body = r#"{"Information": "This is a premium endpoint."}"#;
        let err = DailyAdjustedResponse::from_json(body).unwrap().into_history().unwrap_err();
        assert!(matches!(err, PriceHistoryError::RateLimited(_)));
    }

    #[test]
    fn test_empty_body_is_api_error() {
        let err = DailyAdjustedResponse::from_json("{}").unwrap().into_history().unwrap_err();
        assert!(matches!(err, PriceHistoryError::Api(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = DailyAdjustedResponse::from_json("not json").unwrap_err();
        assert!(matches!(err, PriceHistoryError::Parse(_)));
    }

    #[test]
    fn test_last_refreshed_with_time() {
        let meta = MetaData {
            last_refreshed: "2024-01-04 16:00:01".into(),
            ..MetaData::default()
        };
        assert_eq!(meta.last_refreshed_date(), NaiveDate::from_ymd_opt(2024, 1, 4));
    }

    #[test]
    fn test_output_size() {
        assert_eq!(OutputSize::default(), OutputSize::Full);
        assert_eq!(OutputSize::Compact.as_str(), "compact");
    }
}
