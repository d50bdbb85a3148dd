//! Forecast Pipeline Integration Tests
//!
//! Drives the public API end to end without network access:
//! 1. Saved Alpha Vantage response -> SnapshotSource -> PipelineDriver
//! 2. PipelineDriver -> DelimitedExporter -> file on disk
//! 3. TOML configuration -> SimulationConfig -> pipeline
//!
//! All runs are seeded and deterministic.

use std::io::Write;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use tempfile::{tempdir, NamedTempFile};

use gbm_forecast::adapters::alpha_vantage::SnapshotSource;
use gbm_forecast::adapters::export::{percentile_label, DelimitedExporter};
use gbm_forecast::application::{PipelineDriver, PipelineError};
use gbm_forecast::config::load_config;
use gbm_forecast::ports::{PriceHistoryError, PriceHistoryPort};
use gbm_forecast::simulation::SimulationConfig;

// ============================================================================
// Test Fixtures
// ============================================================================

/// One daily entry in provider format
fn bar_json(date: &str, open: &str, close: &str) -> String {
    format!(
        r#""{}": {{"1. open": "{}", "2. high": "{}", "3. low": "{}", "4. close": "{}",
            "5. adjusted close": "{}", "6. volume": "1000000",
            "7. dividend amount": "0.0000", "8. split coefficient": "1.0"}}"#,
        date, open, open, close, close, close
    )
}

/// Saved TIME_SERIES_DAILY_ADJUSTED response with `days` bars and an
/// optional extra entry appended verbatim
fn snapshot_json(symbol: &str, days: usize, extra: Option<String>) -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut entries: Vec<String> = (0..days)
        .map(|i| {
            let date = (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string();
            let open = 100.0 + (i % 7) as f64;
            let close = open * (1.0 + 0.01 * (((i * 3) % 5) as f64 - 2.0));
            bar_json(&date, &format!("{:.4}", open), &format!("{:.4}", close))
        })
        .collect();
    entries.extend(extra);

    format!(
        r#"{{
    "Meta Data": {{
        "1. Information": "Daily Time Series with Splits and Dividend Events",
        "2. Symbol": "{}",
        "3. Last Refreshed": "2024-03-01",
        "4. Output Size": "Full size",
        "5. Time Zone": "US/Eastern"
    }},
    "Time Series (Daily)": {{
        {}
    }}
}}"#,
        symbol,
        entries.join(",\n        ")
    )
}

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn config() -> SimulationConfig {
    SimulationConfig::default()
        .with_simulations(400)
        .with_length(30)
        .with_seed(2024)
}

// ============================================================================
// End-to-end runs
// ============================================================================

#[tokio::test]
async fn test_replay_writes_percentile_table() {
    let snapshot = write_file(&snapshot_json("GOOG", 60, None));
    let dir = tempdir().unwrap();
    let out = dir.path().join("goog.csv");

    let source = SnapshotSource::new(snapshot.path());
    let exporter = DelimitedExporter::new(&out);
    let report = PipelineDriver::new(config())
        .forecast(&source, "GOOG", &exporter)
        .await
        .unwrap();

    assert_eq!(report.statistics.sample_size, 60);
    assert_eq!(report.path_count, 400);
    assert_eq!(report.selected.len(), 5);
    assert!(report.skipped.is_empty());
    assert_eq!(report.seed, Some(2024));

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 30);
    assert_eq!(lines[0], "0,0.00000,0.00000,0.00000,0.00000,0.00000");

    let row = Regex::new(r"^\d+(,-?\d+\.\d{5}){5}$").unwrap();
    for (i, line) in lines.iter().enumerate() {
        assert!(row.is_match(line), "bad row {}: {}", i, line);
        assert!(line.starts_with(&format!("{},", i)));
    }

    // Percentiles ascend, so the final row ascends too
    let last: Vec<f64> = lines[29]
        .split(',')
        .skip(1)
        .map(|v| v.parse().unwrap())
        .collect();
    assert!(last.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_same_seed_same_output() {
    let snapshot = write_file(&snapshot_json("GOOG", 40, None));
    let dir = tempdir().unwrap();
    let source = SnapshotSource::new(snapshot.path());

    let mut outputs = Vec::new();
    for name in ["a.csv", "b.csv"] {
        let out = dir.path().join(name);
        PipelineDriver::new(config())
            .forecast(&source, "GOOG", &DelimitedExporter::new(&out))
            .await
            .unwrap();
        outputs.push(std::fs::read_to_string(&out).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);

    let out = dir.path().join("c.csv");
    PipelineDriver::new(config().with_seed(2025))
        .forecast(&source, "GOOG", &DelimitedExporter::new(&out))
        .await
        .unwrap();
    assert_ne!(outputs[0], std::fs::read_to_string(&out).unwrap());
}

#[tokio::test]
async fn test_malformed_bar_is_skipped() {
    let bad = bar_json("2024-06-01", "0.0000", "101.0000");
    let snapshot = write_file(&snapshot_json("GOOG", 20, Some(bad)));
    let dir = tempdir().unwrap();

    let report = PipelineDriver::new(config())
        .forecast(
            &SnapshotSource::new(snapshot.path()),
            "GOOG",
            &DelimitedExporter::new(dir.path().join("out.csv")),
        )
        .await
        .unwrap();

    assert_eq!(report.statistics.sample_size, 20);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].date, "2024-06-01");
}

#[tokio::test]
async fn test_rate_limited_snapshot_propagates() {
    let snapshot = write_file(r#"{"Note": "API call frequency exceeded"}"#);
    let dir = tempdir().unwrap();
    let out = dir.path().join("never.csv");

    let err = PipelineDriver::new(config())
        .forecast(&SnapshotSource::new(snapshot.path()), "GOOG", &DelimitedExporter::new(&out))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::PriceHistory(PriceHistoryError::RateLimited(_))
    ));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_snapshot_source_reads_history() {
    let snapshot = write_file(&snapshot_json("IBM", 5, None));
    let history = SnapshotSource::new(snapshot.path())
        .fetch_daily("IBM")
        .await
        .unwrap();

    assert_eq!(history.len(), 5);
    assert_eq!(history.keys().next().map(String::as_str), Some("2024-01-01"));
}

// ============================================================================
// Configuration driven run
// ============================================================================

#[tokio::test]
async fn test_config_file_drives_pipeline() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("ibm.tsv");
    let toml = format!(
        r#"
[simulation]
simulations = 250
length = 12
seed = 5
percentiles = [0.1, 0.5, 0.9]
parallel = false

[data_source]
ticker = "IBM"

[output]
path = "{}"
delimiter = "\t"
header = true
"#,
        out.display()
    );
    let config_file = write_file(&toml);
    let config = load_config(config_file.path()).unwrap();

    let labels = config.simulation.percentiles.iter().map(|p| percentile_label(*p)).collect();
    let exporter = DelimitedExporter::new(config.output.resolved_path())
        .with_delimiter(config.output.delimiter_char())
        .with_header(labels);

    let snapshot = write_file(&snapshot_json("IBM", 30, None));
    let report = PipelineDriver::new(SimulationConfig::from(&config))
        .forecast(&SnapshotSource::new(snapshot.path()), &config.data_source.ticker, &exporter)
        .await
        .unwrap();

    assert_eq!(report.path_count, 250);
    assert_eq!(report.selected.len(), 3);

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], "step\tp10\tp50\tp90");
    assert_eq!(lines[1], "0\t0.00000\t0.00000\t0.00000");
}
