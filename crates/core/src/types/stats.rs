//! Reading statistics

use serde::{Deserialize, Serialize};

/// Smallest denominator used when scaling yearly counts
pub const MIN_SCALE_BASE: i64 = 10;

/// Number of books in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub to_read: i64,
    pub reading: i64,
    pub finished: i64,
}

impl StatusCounts {
    /// Total number of books
    pub fn total(&self) -> i64 {
        self.to_read + self.reading + self.finished
    }

    /// Percentage of books that are finished
    pub fn finished_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.finished as f64 / total as f64) * 100.0
    }
}

/// Books finished in one calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    pub count: i64,
    /// `count` as a percentage of the scale base shared by all years
    pub ratio: i64,
}

impl YearRecord {
    /// Creates a record with a zero ratio; see [`YearRecord::normalize`]
    pub fn new(year: i32, count: i64) -> Self {
        Self {
            year,
            count,
            ratio: 0,
        }
    }

    /// Fills in `ratio` for every record against a shared scale base
    pub fn normalize(records: &mut [YearRecord]) {
        let max = records.iter().map(|r| r.count).max().unwrap_or(0);
        let base = scale_base(max);
        for record in records.iter_mut() {
            record.ratio = record.count * 100 / base;
        }
    }
}

/// `max(10, max_count rounded up to the next multiple of ten)`
pub fn scale_base(max_count: i64) -> i64 {
    let rounded = (max_count + 9) / 10 * 10;
    rounded.max(MIN_SCALE_BASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_base() {
        assert_eq!(scale_base(0), 10);
        assert_eq!(scale_base(1), 10);
        assert_eq!(scale_base(10), 10);
        assert_eq!(scale_base(11), 20);
        assert_eq!(scale_base(20), 20);
        assert_eq!(scale_base(21), 30);
    }

    #[test]
    fn test_normalize_small_counts() {
        let mut records = vec![YearRecord::new(2024, 4), YearRecord::new(2023, 2)];
        YearRecord::normalize(&mut records);
        assert_eq!(records[0].ratio, 40);
        assert_eq!(records[1].ratio, 20);
    }

    #[test]
    fn test_normalize_truncates() {
        let mut records = vec![YearRecord::new(2024, 13), YearRecord::new(2023, 7)];
        YearRecord::normalize(&mut records);
        // base is 20
        assert_eq!(records[0].ratio, 65);
        assert_eq!(records[1].ratio, 35);

        let mut records = vec![YearRecord::new(2024, 1), YearRecord::new(2023, 29)];
        YearRecord::normalize(&mut records);
        // base is 30: 100 / 30 truncates to 3
        assert_eq!(records[0].ratio, 3);
        assert_eq!(records[1].ratio, 96);
    }

    #[test]
    fn test_normalize_multiple_of_ten_fills_bar() {
        let mut records = vec![YearRecord::new(2024, 20)];
        YearRecord::normalize(&mut records);
        assert_eq!(records[0].ratio, 100);
    }

    #[test]
    fn test_normalize_empty() {
        let mut records: Vec<YearRecord> = Vec::new();
        YearRecord::normalize(&mut records);
        assert!(records.is_empty());
    }

    #[test]
    fn test_status_counts() {
        let counts = StatusCounts {
            to_read: 2,
            reading: 1,
            finished: 7,
        };
        assert_eq!(counts.total(), 10);
        assert!((counts.finished_percentage() - 70.0).abs() < 0.01);
        assert_eq!(StatusCounts::default().finished_percentage(), 0.0);
    }
}
