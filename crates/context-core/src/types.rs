use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::ContextError;

/// Textual marker used wherever an indicator could not be computed
pub const UNKNOWN_MARKER: &str = "UNKNOWN";

/// Single daily close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Closing prices, strictly ascending by timestamp.
///
/// Only constructed through [`PriceSeries::new`], which rejects unordered or
/// duplicate timestamps and non-finite prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ContextError> {
        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ContextError::InvalidData(format!(
                "non-finite close at {}",
                bad.timestamp
            )));
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(ContextError::InvalidData(format!(
                "timestamps not strictly ascending at {}",
                pair[1].timestamp
            )));
        }

        Ok(Self { points })
    }

    /// Build a series of one close per day starting at `start`
    pub fn from_daily_closes(start: DateTime<Utc>, closes: &[f64]) -> Result<Self, ContextError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: start + Duration::days(i as i64),
                close,
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Position of the latest close relative to its 20-period moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaStatus {
    Above,
    Below,
    Unknown,
}

impl MaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaStatus::Above => "ABOVE",
            MaStatus::Below => "BELOW",
            MaStatus::Unknown => UNKNOWN_MARKER,
        }
    }
}

impl fmt::Display for MaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric indicator that may be unknown.
///
/// Serializes as a JSON number, or as the string `"UNKNOWN"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Value(f64),
    Unknown,
}

impl IndicatorValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            IndicatorValue::Value(v) => Some(*v),
            IndicatorValue::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, IndicatorValue::Unknown)
    }
}

impl From<Option<f64>> for IndicatorValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(IndicatorValue::Unknown, IndicatorValue::Value)
    }
}

impl fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorValue::Value(v) => write!(f, "{:.2}", v),
            IndicatorValue::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

impl Serialize for IndicatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndicatorValue::Value(v) => serializer.serialize_f64(*v),
            IndicatorValue::Unknown => serializer.serialize_str(UNKNOWN_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for IndicatorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(IndicatorValue::Value(v)),
            Raw::Marker(s) if s == UNKNOWN_MARKER => Ok(IndicatorValue::Unknown),
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{}\", got {:?}",
                UNKNOWN_MARKER, other
            ))),
        }
    }
}

/// Latest price and indicators for one tracked asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuote {
    pub asset: String,
    pub price: f64,
    pub change_pct: f64,
    pub ma20_status: MaStatus,
    pub rsi: IndicatorValue,
}

/// Quotes in configuration order; failed tickers are left out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketSnapshot {
    pub quotes: Vec<AssetQuote>,
}

impl MarketSnapshot {
    pub fn new(quotes: Vec<AssetQuote>) -> Self {
        Self { quotes }
    }

    pub fn get(&self, asset: &str) -> Option<&AssetQuote> {
        self.quotes.iter().find(|q| q.asset == asset)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetQuote> {
        self.quotes.iter()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Policy rate reading (e.g. effective fed funds rate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroIndicator {
    pub series_id: String,
    pub rate: Option<f64>,
    pub note: String,
}

impl MacroIndicator {
    pub fn available(series_id: impl Into<String>, rate: f64, note: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            rate: Some(rate),
            note: note.into(),
        }
    }

    /// Reading with no rate; `note` carries the failure text
    pub fn degraded(series_id: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            rate: None,
            note: note.into(),
        }
    }
}

/// Raw sentiment index as returned by a [`crate::SentimentSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreedScore {
    pub score: f64,
    pub rating: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// 0 (extreme fear) to 100 (extreme greed)
    pub score: Option<u8>,
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SentimentReading {
    /// Clamp to 0-100 and drop the fractional part
    pub fn from_index(index: FearGreedScore) -> Self {
        let score = if index.score.is_finite() {
            Some(index.score.clamp(0.0, 100.0).trunc() as u8)
        } else {
            None
        };
        Self {
            score,
            rating: Some(index.rating),
            error: None,
        }
    }

    pub fn degraded(note: impl Into<String>) -> Self {
        Self {
            score: None,
            rating: None,
            error: Some(note.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Headline as delivered by the news provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    /// Provider-native timestamp string, kept verbatim
    pub published: String,
    pub link: String,
}

/// Everything gathered in one aggregation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedContext {
    pub market: MarketSnapshot,
    #[serde(rename = "macro")]
    pub macro_indicator: MacroIndicator,
    pub sentiment: SentimentReading,
    pub news: Vec<NewsItem>,
}

/// Display label paired with the provider symbol it is fetched under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedTicker {
    pub label: String,
    pub symbol: String,
}

impl TrackedTicker {
    pub fn new(label: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
        }
    }
}

impl FromStr for TrackedTicker {
    type Err = ContextError;

    /// Parses `LABEL=SYMBOL`. Only the first `=` separates, so `Gold=GC=F` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, symbol) = s
            .split_once('=')
            .map(|(l, r)| (l.trim(), r.trim()))
            .filter(|(l, r)| !l.is_empty() && !r.is_empty())
            .ok_or_else(|| {
                ContextError::InvalidData(format!("expected LABEL=SYMBOL, got {:?}", s))
            })?;
        Ok(Self::new(label, symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap()
    }

    #[test]
    fn test_price_series_rejects_duplicate_timestamps() {
        let ts = start();
        let points = vec![
            PricePoint { timestamp: ts, close: 1.0 },
            PricePoint { timestamp: ts, close: 2.0 },
        ];
        assert!(matches!(PriceSeries::new(points), Err(ContextError::InvalidData(_))));
    }

    #[test]
    fn test_price_series_rejects_descending_timestamps() {
        let points = vec![
            PricePoint { timestamp: start() + Duration::days(1), close: 1.0 },
            PricePoint { timestamp: start(), close: 2.0 },
        ];
        assert!(PriceSeries::new(points).is_err());
    }

    #[test]
    fn test_price_series_rejects_nan() {
        assert!(PriceSeries::from_daily_closes(start(), &[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_indicator_value_serializes_unknown_marker() {
        assert_eq!(serde_json::to_value(IndicatorValue::Unknown).unwrap(), "UNKNOWN");
        assert_eq!(serde_json::to_value(IndicatorValue::Value(55.5)).unwrap(), 55.5);

        let back: IndicatorValue = serde_json::from_str("\"UNKNOWN\"").unwrap();
        assert!(back.is_unknown());
        assert!(serde_json::from_str::<IndicatorValue>("\"bogus\"").is_err());
    }

    #[test]
    fn test_ma_status_serialization() {
        assert_eq!(serde_json::to_value(MaStatus::Above).unwrap(), "ABOVE");
        assert_eq!(serde_json::to_value(MaStatus::Unknown).unwrap(), "UNKNOWN");
    }

    #[test]
    fn test_aggregated_context_uses_macro_key() {
        let ctx = AggregatedContext {
            market: MarketSnapshot::default(),
            macro_indicator: MacroIndicator::degraded("FEDFUNDS", "down"),
            sentiment: SentimentReading::degraded("down"),
            news: vec![],
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("macro").is_some());
        assert!(json["market"].is_array());
        assert!(json["macro"]["rate"].is_null());
    }

    #[test]
    fn test_sentiment_from_index_clamps_and_truncates() {
        let reading = SentimentReading::from_index(FearGreedScore {
            score: 62.9,
            rating: "greed".to_string(),
        });
        assert_eq!(reading.score, Some(62));

        let reading = SentimentReading::from_index(FearGreedScore {
            score: 140.0,
            rating: "extreme greed".to_string(),
        });
        assert_eq!(reading.score, Some(100));
        assert!(!reading.is_degraded());
    }

    #[test]
    fn test_tracked_ticker_parse_keeps_symbol_equals() {
        let ticker: TrackedTicker = "Gold=GC=F".parse().unwrap();
        assert_eq!(ticker.label, "Gold");
        assert_eq!(ticker.symbol, "GC=F");

        assert!("NoSymbol".parse::<TrackedTicker>().is_err());
        assert!("=^GSPC".parse::<TrackedTicker>().is_err());
    }
}
