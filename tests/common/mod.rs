#![allow(dead_code)]

use chrono::NaiveDate;
use reversion::domain::error::ReversionError;
use reversion::domain::price_series::{AssetPriceTrack, PricePoint};
use reversion::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, AssetPriceTrack>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_track(mut self, source: &str, track: AssetPriceTrack) -> Self {
        self.data.insert(source.to_string(), track);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(&self, source: &str) -> Result<AssetPriceTrack, ReversionError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(ReversionError::input(reason.clone()));
        }
        self.data
            .get(source)
            .cloned()
            .ok_or_else(|| ReversionError::input(format!("no data for {source}")))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Track with one close per calendar day starting at `start`.
pub fn make_track(symbol: &str, start: &str, closes: &[f64]) -> AssetPriceTrack {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    AssetPriceTrack::new(
        symbol,
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect(),
    )
}

/// `[100]*flat + [dip, recover]`
pub fn dip_closes(flat: usize, dip: f64, recover: f64) -> Vec<f64> {
    let mut closes = vec![100.0; flat];
    closes.push(dip);
    closes.push(recover);
    closes
}

/// Deterministic saw-tooth around 100 for longer runs.
pub fn oscillating_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + 10.0 * ((i as f64) * 0.7).sin() + (i % 5) as f64)
        .collect()
}

/// CSV in the two-header-row layout the loader expects by default.
pub fn yahoo_csv(start: &str, closes: &[f64]) -> String {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let mut out = String::from("Price,Close,High,Low,Open,Volume\nTicker,X,X,X,X,X\nDate,,,,,\n");
    for (i, close) in closes.iter().enumerate() {
        let d = start + chrono::Duration::days(i as i64);
        out.push_str(&format!("{d},{close},{close},{close},{close},1000\n"));
    }
    out
}
