//! Input data port trait.
//!
//! Every method returns records for a single ticker. Market bars come back
//! sorted by date; sentiment events and earnings records in any order.

use crate::domain::earnings::EarningsRecord;
use crate::domain::error::FusetraderError;
use crate::domain::market_bar::MarketBar;
use crate::domain::news::SentimentEvent;

pub trait DataPort {
    fn fetch_market(&self, ticker: &str) -> Result<Vec<MarketBar>, FusetraderError>;

    fn fetch_sentiment(&self, ticker: &str) -> Result<Vec<SentimentEvent>, FusetraderError>;

    fn fetch_earnings(&self, ticker: &str) -> Result<Vec<EarningsRecord>, FusetraderError>;
}
