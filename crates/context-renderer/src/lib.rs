//! Plain-text rendering of an [`AggregatedContext`] for language-model prompts.
//!
//! Output depends only on the context and the renderer settings, so the same
//! context always renders to the same bytes.

use context_core::{AggregatedContext, MacroIndicator, MarketSnapshot, NewsItem, SentimentReading};
use std::fmt::Write;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

const MARKET_COLUMNS: [(&str, Align); 5] = [
    ("Asset", Align::Left),
    ("Price", Align::Right),
    ("Change_%", Align::Right),
    ("MA20_Status", Align::Left),
    ("RSI", Align::Right),
];

#[derive(Debug, Clone)]
pub struct ContextRenderer {
    max_news_items: usize,
    /// Only used in the news heading; filtering is the news source's job
    news_window_days: u32,
}

impl Default for ContextRenderer {
    fn default() -> Self {
        Self::new(5, 3)
    }
}

impl ContextRenderer {
    pub fn new(max_news_items: usize, news_window_days: u32) -> Self {
        Self {
            max_news_items,
            news_window_days,
        }
    }

    pub fn render(&self, ctx: &AggregatedContext) -> String {
        let mut out = String::new();

        out.push_str("=== MARKET DATA (Technical & Price) ===\n");
        out.push_str(&market_table(&ctx.market));

        out.push_str("\n=== LIQUIDITY & MACRO ===\n");
        out.push_str(&macro_section(&ctx.macro_indicator));

        out.push_str("\n=== SENTIMENT ===\n");
        out.push_str(&sentiment_section(&ctx.sentiment));

        let _ = writeln!(
            out,
            "\n=== KEY MACRO NEWS (Last {} Days) ===",
            self.news_window_days
        );
        out.push_str(&self.news_section(&ctx.news));

        out
    }

    fn news_section(&self, news: &[NewsItem]) -> String {
        let shown: Vec<&NewsItem> = news.iter().take(self.max_news_items).collect();
        if shown.is_empty() {
            return format!("- {}\n", NOT_AVAILABLE);
        }

        let mut out = String::new();
        for item in shown {
            let _ = writeln!(
                out,
                "- {} (Source: {})",
                or_na(&single_line(&item.title)),
                or_na(&single_line(&item.source))
            );
        }
        out
    }
}

/// Markdown pipe table, one row per quote in snapshot order
fn market_table(market: &MarketSnapshot) -> String {
    if market.is_empty() {
        return format!("{}\n", NOT_AVAILABLE);
    }

    let rows: Vec<[String; 5]> = market
        .iter()
        .map(|q| {
            [
                table_cell(&q.asset),
                format!("{:.2}", q.price),
                format!("{:.2}", q.change_pct),
                q.ma20_status.to_string(),
                q.rsi.to_string(),
            ]
        })
        .collect();

    let mut widths: [usize; 5] = MARKET_COLUMNS.map(|(name, _)| name.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();

    let header: Vec<String> = MARKET_COLUMNS.iter().map(|(name, _)| name.to_string()).collect();
    out.push_str(&table_row(&header, &widths));

    let separator: Vec<String> = MARKET_COLUMNS
        .iter()
        .zip(widths.iter())
        .map(|((_, align), &width)| match align {
            Align::Left => format!(":{}", "-".repeat(width + 1)),
            Align::Right => format!("{}:", "-".repeat(width + 1)),
        })
        .collect();
    let _ = writeln!(out, "|{}|", separator.join("|"));

    for row in &rows {
        out.push_str(&table_row(row, &widths));
    }

    out
}

fn table_row(cells: &[String], widths: &[usize; 5]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .zip(MARKET_COLUMNS.iter())
        .map(|((cell, &width), (_, align))| {
            let pad = " ".repeat(width.saturating_sub(cell.chars().count()));
            match align {
                Align::Left => format!(" {}{} ", cell, pad),
                Align::Right => format!(" {}{} ", pad, cell),
            }
        })
        .collect();
    format!("|{}|\n", padded.join("|"))
}

fn macro_section(indicator: &MacroIndicator) -> String {
    let rate = indicator
        .rate
        .map(|r| format!("{}%", r))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut out = String::new();
    let _ = writeln!(out, "- Fed Funds Rate: {}", rate);
    let _ = writeln!(out, "- Note: {}", or_na(&single_line(&indicator.note)));
    out.push_str("- 10Y Yield Trend: See '10Y_Yield' in Market Data.\n");
    out
}

fn sentiment_section(reading: &SentimentReading) -> String {
    let score = reading
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let rating = reading.rating.as_deref().map(single_line).unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "- CNN Fear & Greed Index: {} ({})", score, or_na(&rating));
    if let Some(error) = &reading.error {
        let _ = writeln!(out, "- Note: {}", or_na(&single_line(error)));
    }
    out.push_str("- VIX Level: See 'VIX' in Market Data.\n");
    out
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn table_cell(s: &str) -> String {
    single_line(s).replace('|', "\\|")
}

fn or_na(s: &str) -> &str {
    if s.is_empty() {
        NOT_AVAILABLE
    } else {
        s
    }
}
