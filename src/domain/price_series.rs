//! Daily close series for one or more assets.

use crate::domain::error::ReversionError;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetPriceTrack {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl AssetPriceTrack {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

/// Equal-length, date-aligned tracks. Only constructible through [`PriceSeries::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    tracks: Vec<AssetPriceTrack>,
}

impl PriceSeries {
    pub fn new(tracks: Vec<AssetPriceTrack>) -> Result<Self, ReversionError> {
        let first = tracks
            .first()
            .ok_or_else(|| ReversionError::input("price series has no assets"))?;
        if first.is_empty() {
            return Err(ReversionError::input(format!(
                "price track {} is empty",
                first.symbol
            )));
        }

        for track in &tracks {
            if track.len() != first.len() {
                return Err(ReversionError::input(format!(
                    "price track {} has {} days, expected {}",
                    track.symbol,
                    track.len(),
                    first.len()
                )));
            }

            for (i, point) in track.points.iter().enumerate() {
                if !point.close.is_finite() || point.close <= 0.0 {
                    return Err(ReversionError::input(format!(
                        "{}: close {} on {} is not strictly positive",
                        track.symbol, point.close, point.date
                    )));
                }
                if i > 0 && point.date <= track.points[i - 1].date {
                    return Err(ReversionError::input(format!(
                        "{}: dates not strictly increasing at {}",
                        track.symbol, point.date
                    )));
                }
                if point.date != first.points[i].date {
                    return Err(ReversionError::input(format!(
                        "{}: date {} does not line up with {} in {}",
                        track.symbol, point.date, first.points[i].date, first.symbol
                    )));
                }
            }
        }

        Ok(Self { tracks })
    }

    /// Single-asset series from bare closes on consecutive calendar days.
    pub fn from_closes(
        symbol: &str,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, ReversionError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        Self::new(vec![AssetPriceTrack::new(symbol, points)])
    }

    pub fn asset_count(&self) -> usize {
        self.tracks.len()
    }

    /// Number of trading days shared by every track.
    pub fn len(&self) -> usize {
        self.tracks[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.tracks[0].dates()
    }

    pub fn closes(&self) -> Vec<Vec<f64>> {
        self.tracks.iter().map(AssetPriceTrack::closes).collect()
    }
}

/// Keep only the dates present in every track.
pub fn align_tracks(tracks: Vec<AssetPriceTrack>) -> Vec<AssetPriceTrack> {
    let Some((first, rest)) = tracks.split_first() else {
        return tracks;
    };

    let mut common: BTreeSet<NaiveDate> = first.points.iter().map(|p| p.date).collect();
    for track in rest {
        let dates: BTreeSet<NaiveDate> = track.points.iter().map(|p| p.date).collect();
        common = common.intersection(&dates).copied().collect();
    }

    tracks
        .into_iter()
        .map(|track| AssetPriceTrack {
            symbol: track.symbol,
            points: track
                .points
                .into_iter()
                .filter(|p| common.contains(&p.date))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn track(symbol: &str, days: &[(u32, f64)]) -> AssetPriceTrack {
        AssetPriceTrack::new(
            symbol,
            days.iter()
                .map(|&(d, close)| PricePoint {
                    date: date(2024, 1, d),
                    close,
                })
                .collect(),
        )
    }

    #[test]
    fn new_accepts_aligned_tracks() {
        let series = PriceSeries::new(vec![
            track("SPY", &[(2, 100.0), (3, 101.0), (4, 102.0)]),
            track("QQQ", &[(2, 50.0), (3, 49.0), (4, 48.0)]),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.asset_count(), 2);
        assert_eq!(series.closes()[1], vec![50.0, 49.0, 48.0]);
        assert_eq!(series.dates()[0], date(2024, 1, 2));
    }

    #[test]
    fn new_rejects_empty() {
        assert!(PriceSeries::new(vec![]).unwrap_err().is_input());
        assert!(
            PriceSeries::new(vec![track("SPY", &[])])
                .unwrap_err()
                .is_input()
        );
    }

    #[test]
    fn new_rejects_unequal_lengths() {
        let err = PriceSeries::new(vec![
            track("SPY", &[(2, 100.0), (3, 101.0)]),
            track("QQQ", &[(2, 50.0)]),
        ])
        .unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn new_rejects_non_positive_close() {
        let err = PriceSeries::new(vec![track("SPY", &[(2, 100.0), (3, 0.0)])]).unwrap_err();
        assert!(err.to_string().contains("not strictly positive"));

        let err = PriceSeries::new(vec![track("SPY", &[(2, f64::NAN)])]).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn new_rejects_unordered_dates() {
        let err = PriceSeries::new(vec![track("SPY", &[(3, 100.0), (2, 101.0)])]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));

        let err = PriceSeries::new(vec![track("SPY", &[(2, 100.0), (2, 101.0)])]).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn new_rejects_misaligned_dates() {
        let err = PriceSeries::new(vec![
            track("SPY", &[(2, 100.0), (3, 101.0)]),
            track("QQQ", &[(2, 50.0), (4, 49.0)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("does not line up"));
    }

    #[test]
    fn calendar_gaps_are_accepted() {
        let series = PriceSeries::new(vec![track("SPY", &[(2, 100.0), (5, 101.0), (9, 99.0)])]);
        assert!(series.is_ok());
    }

    #[test]
    fn from_closes_uses_consecutive_days() {
        let series = PriceSeries::from_closes("SPY", date(2024, 1, 1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            series.dates(),
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
    }

    #[test]
    fn align_tracks_intersects_dates() {
        let aligned = align_tracks(vec![
            track("SPY", &[(2, 100.0), (3, 101.0), (4, 102.0), (5, 103.0)]),
            track("QQQ", &[(3, 50.0), (4, 49.0), (5, 48.0), (8, 47.0)]),
            track("IWM", &[(2, 20.0), (4, 21.0), (5, 22.0)]),
        ]);

        for t in &aligned {
            assert_eq!(t.dates(), vec![date(2024, 1, 4), date(2024, 1, 5)]);
        }
        assert_eq!(aligned[0].closes(), vec![102.0, 103.0]);
        assert_eq!(aligned[1].closes(), vec![49.0, 48.0]);
        assert!(PriceSeries::new(aligned).is_ok());
    }

    #[test]
    fn align_tracks_empty_input() {
        assert!(align_tracks(vec![]).is_empty());
    }
}
