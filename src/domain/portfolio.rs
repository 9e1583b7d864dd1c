//! Wealth tracking relative to initial capital.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WealthPoint {
    pub date: Option<NaiveDate>,
    pub value: f64,
}

/// Cumulative portfolio value, seeded at 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct WealthSeries {
    pub points: Vec<WealthPoint>,
}

impl WealthSeries {
    pub const SEED: f64 = 1.0;

    pub fn seeded() -> Self {
        WealthSeries {
            points: vec![WealthPoint {
                date: None,
                value: Self::SEED,
            }],
        }
    }

    /// Append the next value as `last * growth`.
    pub fn record_growth(&mut self, growth: f64) {
        let next = self.last() * growth;
        self.points.push(WealthPoint {
            date: None,
            value: next,
        });
    }

    /// Label each point with a date, starting from the first.
    pub fn with_dates(mut self, dates: &[NaiveDate]) -> Self {
        for (point, &date) in self.points.iter_mut().zip(dates) {
            point.date = Some(date);
        }
        self
    }

    pub fn last(&self) -> f64 {
        self.points.last().map(|p| p.value).unwrap_or(Self::SEED)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.points.windows(2).all(|w| w[1].value >= w[0].value)
    }
}

impl From<Vec<f64>> for WealthSeries {
    fn from(values: Vec<f64>) -> Self {
        WealthSeries {
            points: values
                .into_iter()
                .map(|value| WealthPoint { date: None, value })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_series() {
        let wealth = WealthSeries::seeded();
        assert_eq!(wealth.len(), 1);
        assert_eq!(wealth.values(), vec![1.0]);
        assert!(wealth.points[0].date.is_none());
    }

    #[test]
    fn record_growth_compounds() {
        let mut wealth = WealthSeries::seeded();
        wealth.record_growth(1.5);
        wealth.record_growth(1.0);
        wealth.record_growth(0.5);
        assert_eq!(wealth.values(), vec![1.0, 1.5, 1.5, 0.75]);
        assert!((wealth.last() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn with_dates_labels_points() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let wealth = WealthSeries::from(vec![1.0, 1.1]).with_dates(&[d0, d1]);
        assert_eq!(wealth.points[0].date, Some(d0));
        assert_eq!(wealth.points[1].date, Some(d1));
    }

    #[test]
    fn non_decreasing_detection() {
        assert!(WealthSeries::from(vec![1.0, 1.0, 1.2]).is_non_decreasing());
        assert!(!WealthSeries::from(vec![1.0, 1.2, 1.1]).is_non_decreasing());
        assert!(WealthSeries::seeded().is_non_decreasing());
    }

    #[test]
    fn empty_series_last_is_seed() {
        let wealth = WealthSeries::from(Vec::new());
        assert!(wealth.is_empty());
        assert!((wealth.last() - 1.0).abs() < f64::EPSILON);
    }
}
