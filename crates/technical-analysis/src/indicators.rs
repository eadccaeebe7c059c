use context_core::MaStatus;

/// Moving-average window used for [`ma_status`]
pub const MA_PERIOD: usize = 20;

/// Number of deltas averaged by [`rsi_latest`]
pub const RSI_PERIOD: usize = 14;

/// Average of the most recent `period` values, or `None` if there are fewer
pub fn latest_sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    let window = &data[data.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Relative Strength Index over the last `period` deltas.
///
/// Gains and losses are plain averages of the window (no Wilder smoothing).
/// A window with no losses yields 100.
pub fn rsi_latest(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period + 1 {
        return None;
    }

    let window = &data[data.len() - period - 1..];
    let (gain_sum, loss_sum) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gain, loss), change| {
            if change > 0.0 {
                (gain + change, loss)
            } else {
                (gain, loss - change)
            }
        });

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Percent change between the last two observations.
///
/// `None` with fewer than two values or when the previous value is zero.
pub fn percent_change(data: &[f64]) -> Option<f64> {
    let [.., previous, current] = data else {
        return None;
    };
    if *previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Latest close against its moving average; ties count as below
pub fn ma_status(data: &[f64], period: usize) -> MaStatus {
    match (data.last(), latest_sma(data, period)) {
        (Some(&current), Some(average)) if current > average => MaStatus::Above,
        (Some(_), Some(_)) => MaStatus::Below,
        _ => MaStatus::Unknown,
    }
}

/// Two decimals; `-0.0` is folded into `0.0`
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}
