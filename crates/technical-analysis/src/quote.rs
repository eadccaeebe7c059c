use context_core::{AssetQuote, ContextError, IndicatorValue, PriceSeries};

use crate::indicators::{ma_status, percent_change, round2, rsi_latest, MA_PERIOD, RSI_PERIOD};

/// Turn a closing-price series into a display-ready quote.
///
/// Fails only when the latest move cannot be computed (fewer than two closes,
/// or a zero previous close). Short windows degrade the indicators to
/// `UNKNOWN` instead.
pub fn compute_quote(asset: &str, series: &PriceSeries) -> Result<AssetQuote, ContextError> {
    let closes = series.closes();

    if closes.len() < 2 {
        return Err(ContextError::InsufficientData(format!(
            "{}: need at least 2 closes for a price change, got {}",
            asset,
            closes.len()
        )));
    }

    let current = closes[closes.len() - 1];
    let change_pct = percent_change(&closes).ok_or_else(|| {
        ContextError::InvalidData(format!("{}: previous close is zero", asset))
    })?;

    let ma20_status = ma_status(&closes, MA_PERIOD);
    let rsi = IndicatorValue::from(rsi_latest(&closes, RSI_PERIOD).map(round2));

    tracing::debug!(
        asset,
        points = closes.len(),
        ma20 = %ma20_status,
        rsi = %rsi,
        "Computed quote"
    );

    Ok(AssetQuote {
        asset: asset.to_string(),
        price: round2(current),
        change_pct: round2(change_pct),
        ma20_status,
        rsi,
    })
}
