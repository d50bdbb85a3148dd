use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::PriceHistory;
use super::price_history::{PriceHistoryError, PriceHistoryPort};

/// Mock price history source that records calls and serves canned histories
#[derive(Debug, Default, Clone)]
pub struct MockPriceHistory {
    calls: Arc<Mutex<Vec<String>>>,
    responses: Arc<Mutex<HashMap<String, PriceHistory>>>,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the history served for a symbol
    pub fn with_history(self, symbol: &str, history: PriceHistory) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(symbol.to_string(), history);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceHistoryPort for MockPriceHistory {
    async fn fetch_daily(&self, symbol: &str) -> Result<PriceHistory, PriceHistoryError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| PriceHistoryError::Api(format!("Invalid API call for symbol {}", symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyBar;

    #[tokio::test]
    async fn test_mock_price_history() {
        let mut history = PriceHistory::new();
        history.insert("2024-01-02".into(), DailyBar::from_open_close(100.0, 101.0));

        let mock = MockPriceHistory::new().with_history("GOOG", history.clone());

        let result = mock.fetch_daily("GOOG").await.unwrap();
        assert_eq!(result, history);
        assert_eq!(mock.get_calls(), vec!["GOOG".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_unknown_symbol() {
        let mock = MockPriceHistory::new();
        let result = mock.fetch_daily("NOPE").await;
        assert!(matches!(result, Err(PriceHistoryError::Api(_))));
    }
}
