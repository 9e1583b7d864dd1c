//! Price data access port trait.

use crate::domain::error::ReversionError;
use crate::domain::price_series::AssetPriceTrack;

pub trait DataPort {
    /// Daily closes for `source`, sorted by date.
    fn fetch_closes(&self, source: &str) -> Result<AssetPriceTrack, ReversionError>;
}
