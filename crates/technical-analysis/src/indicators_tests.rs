#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use super::super::quote::compute_quote;
    use chrono::{TimeZone, Utc};
    use context_core::{ContextError, IndicatorValue, MaStatus, PriceSeries};

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap();
        PriceSeries::from_daily_closes(start, closes).unwrap()
    }

    #[test]
    fn test_latest_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((latest_sma(&data, 3).unwrap() - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
        assert!((latest_sma(&data, 5).unwrap() - 3.0).abs() < 0.001);
        assert_eq!(latest_sma(&data, 0), None);
    }

    #[test]
    fn test_latest_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert_eq!(latest_sma(&data, 5), None);
    }

    #[test]
    fn test_latest_sma_uses_trailing_window() {
        let prices = sample_prices();
        let latest = latest_sma(&prices, 20).unwrap();
        assert!((latest - 45.409).abs() < 1e-9);

        let tail = latest_sma(&[1.0, 2.0, 3.0, 10.0], 2).unwrap();
        assert!((tail - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_ma_status_unknown_below_window() {
        for len in 0..MA_PERIOD {
            let data: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
            assert_eq!(ma_status(&data, MA_PERIOD), MaStatus::Unknown, "len {}", len);
        }
    }

    #[test]
    fn test_ma_status_tie_counts_as_below() {
        let flat = vec![50.0; 20];
        assert_eq!(ma_status(&flat, MA_PERIOD), MaStatus::Below);
    }

    #[test]
    fn test_ma_status_above_and_below() {
        let mut rising = vec![100.0; 19];
        rising.push(110.0);
        assert_eq!(ma_status(&rising, MA_PERIOD), MaStatus::Above);

        let mut falling = vec![100.0; 19];
        falling.push(90.0);
        assert_eq!(ma_status(&falling, MA_PERIOD), MaStatus::Below);
    }

    #[test]
    fn test_rsi_real_prices() {
        let rsi = rsi_latest(&sample_prices(), RSI_PERIOD).unwrap();
        assert!((rsi - 59.806).abs() < 0.01);
        assert!(rsi >= 0.0 && rsi <= 100.0);
    }

    #[test]
    fn test_rsi_needs_period_deltas() {
        let data: Vec<f64> = (0..14).map(|i| i as f64).collect(); // 13 deltas
        assert_eq!(rsi_latest(&data, RSI_PERIOD), None);

        let data: Vec<f64> = (0..15).map(|i| i as f64).collect(); // 14 deltas
        assert!(rsi_latest(&data, RSI_PERIOD).is_some());
    }

    #[test]
    fn test_rsi_zero_loss_is_100() {
        let rising: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        assert_eq!(rsi_latest(&rising, RSI_PERIOD), Some(100.0));

        let flat = vec![42.0; 15];
        assert_eq!(rsi_latest(&flat, RSI_PERIOD), Some(100.0));
    }

    #[test]
    fn test_rsi_only_losses_is_0() {
        let falling: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let rsi = rsi_latest(&falling, RSI_PERIOD).unwrap();
        assert!(rsi.abs() < 1e-9);
    }

    #[test]
    fn test_rsi_ignores_deltas_outside_window() {
        // A crash before the window must not leak into the loss average
        let mut data = vec![100.0, 10.0];
        data.extend((0..15).map(|i| 10.0 + i as f64));
        assert_eq!(rsi_latest(&data, RSI_PERIOD), Some(100.0));
    }

    #[test]
    fn test_percent_change_last_two_only() {
        let change = percent_change(&[1.0, 200.0, 100.0, 110.0]).unwrap();
        assert!((change - 10.0).abs() < 1e-9);
        assert_eq!(percent_change(&[5.0]), None);
        assert_eq!(percent_change(&[0.0, 5.0]), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(59.80629), 59.81);
        assert_eq!(round2(-1.254868), -1.25);
        assert_eq!(round2(110.0), 110.0);
    }

    #[test]
    fn test_compute_quote_jump_scenario() {
        let mut closes = vec![100.0; 19];
        closes.push(110.0);

        let quote = compute_quote("SPX", &series(&closes)).unwrap();
        assert_eq!(quote.asset, "SPX");
        assert_eq!(quote.price, 110.0);
        assert_eq!(quote.change_pct, 10.0);
        assert_eq!(quote.ma20_status, MaStatus::Above);
        assert_eq!(quote.rsi, IndicatorValue::Value(100.0));
    }

    #[test]
    fn test_compute_quote_real_prices() {
        let quote = compute_quote("XYZ", &series(&sample_prices())).unwrap();
        assert_eq!(quote.price, 45.64);
        assert_eq!(quote.change_pct, -1.25);
        assert_eq!(quote.ma20_status, MaStatus::Above);
        assert_eq!(quote.rsi, IndicatorValue::Value(59.81));
    }

    #[test]
    fn test_compute_quote_short_series_marks_unknown() {
        let quote = compute_quote("VIX", &series(&[14.0, 15.0, 16.5])).unwrap();
        assert_eq!(quote.change_pct, 10.0);
        assert_eq!(quote.ma20_status, MaStatus::Unknown);
        assert!(quote.rsi.is_unknown());
    }

    #[test]
    fn test_compute_quote_rejects_single_point() {
        let err = compute_quote("DXY", &series(&[104.2])).unwrap_err();
        assert!(matches!(err, ContextError::InsufficientData(_)));
    }

    #[test]
    fn test_compute_quote_rejects_zero_previous_close() {
        let err = compute_quote("Crude_Oil", &series(&[0.0, 12.0])).unwrap_err();
        assert!(matches!(err, ContextError::InvalidData(_)));
    }

    #[test]
    fn test_compute_quote_is_deterministic() {
        let s = series(&sample_prices());
        assert_eq!(compute_quote("A", &s).unwrap(), compute_quote("A", &s).unwrap());
    }

    #[test]
    fn test_round2_folds_negative_zero() {
        let rounded = round2(-0.001);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }

    #[test]
    fn test_compute_quote_tiny_drop_renders_unsigned_zero() {
        let quote = compute_quote("DXY", &series(&[100.0, 99.999])).unwrap();
        assert!(quote.change_pct.is_sign_positive());
        assert_eq!(format!("{:.2}", quote.change_pct), "0.00");
    }
}
