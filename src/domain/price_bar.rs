//! Daily Price Bars
//!
//! `DailyBar` is the record exactly as the data provider transmits it (every
//! value as text). `PriceBar` is the parsed form the return estimator works
//! with. Parsing never fails hard: a bad record becomes a `DataQualityIssue`
//! that the caller can collect and audit.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Date-keyed price history. ISO dates sort chronologically, so iteration
/// order is oldest first.
pub type PriceHistory = BTreeMap<String, DailyBar>;

/// One trading day as transmitted by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "1. open", default)]
    pub open: Option<String>,
    #[serde(rename = "2. high", default)]
    pub high: Option<String>,
    #[serde(rename = "3. low", default)]
    pub low: Option<String>,
    #[serde(rename = "4. close", default)]
    pub close: Option<String>,
    #[serde(rename = "5. adjusted close", default)]
    pub adjusted_close: Option<String>,
    #[serde(rename = "6. volume", default)]
    pub volume: Option<String>,
    #[serde(rename = "7. dividend amount", default)]
    pub dividend_amount: Option<String>,
    #[serde(rename = "8. split coefficient", default)]
    pub split_coefficient: Option<String>,
}

impl DailyBar {
    /// Convenience constructor for a bar carrying only open/close
    pub fn from_open_close(open: f64, close: f64) -> Self {
        Self {
            open: Some(open.to_string()),
            close: Some(close.to_string()),
            ..Self::default()
        }
    }
}

/// Why a bar was left out of the return sample
#[derive(Debug, Clone, PartialEq)]
pub enum IssueReason {
    /// Field absent or blank
    MissingField(&'static str),
    /// Field present but not a number
    Unparsable { field: &'static str, text: String },
    /// Zero or negative price
    NonPositive { field: &'static str, value: f64 },
    /// NaN or infinite price
    NonFinite(&'static str),
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueReason::MissingField(field) => write!(f, "missing {}", field),
            IssueReason::Unparsable { field, text } => {
                write!(f, "unparsable {} '{}'", field, text)
            }
            IssueReason::NonPositive { field, value } => {
                write!(f, "non-positive {} {}", field, value)
            }
            IssueReason::NonFinite(field) => write!(f, "non-finite {}", field),
        }
    }
}

/// A recoverable data-quality event: one skipped bar
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityIssue {
    pub date: String,
    pub reason: IssueReason,
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.reason)
    }
}

/// Parsed, validated daily bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: f64,
    pub close: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceBar {
    /// Parse a provider record. Open and close are required and must be
    /// positive finite numbers; the optional fields are kept only when they
    /// parse.
    pub fn parse(date: &str, bar: &DailyBar) -> Result<Self, DataQualityIssue> {
        let issue = |reason| DataQualityIssue {
            date: date.to_string(),
            reason,
        };

        let open = parse_price("open", bar.open.as_deref()).map_err(issue)?;
        let close = parse_price("close", bar.close.as_deref()).map_err(issue)?;

        Ok(Self {
            open,
            close,
            high: parse_optional(bar.high.as_deref()),
            low: parse_optional(bar.low.as_deref()),
            volume: parse_optional(bar.volume.as_deref()),
        })
    }

    /// Continuously-compounded return over the session: ln(close / open)
    pub fn log_return(&self) -> f64 {
        (self.close / self.open).ln()
    }
}

fn parse_price(field: &'static str, text: Option<&str>) -> Result<f64, IssueReason> {
    let text = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(IssueReason::MissingField(field)),
    };

    let value: f64 = text.parse().map_err(|_| IssueReason::Unparsable {
        field,
        text: text.to_string(),
    })?;

    if !value.is_finite() {
        return Err(IssueReason::NonFinite(field));
    }
    if value <= 0.0 {
        return Err(IssueReason::NonPositive { field, value });
    }
    Ok(value)
}

fn parse_optional(text: Option<&str>) -> Option<f64> {
    text.and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
