//! HTTP adapters for the providers behind the daily context.
//!
//! Every adapter makes exactly one attempt per call, bounded by the timeout it
//! was built with, and reports failures as [`context_core::ContextError`].

pub mod fear_greed;
pub mod fred;
pub mod google_news;
mod http;
pub mod yahoo_finance;

pub use fear_greed::FearGreedClient;
pub use fred::FredClient;
pub use google_news::GoogleNewsClient;
pub use http::BROWSER_USER_AGENT;
pub use yahoo_finance::YahooFinanceClient;
