use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How coarse a timeframe is. Used for labels and ordering of otherwise
/// identical intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Half,
    Quarter,
    Month,
    Days,
}

/// A closed date interval `[start, end]` with a granularity.
///
/// Deserialized values go through `Timeframe::new`, so reversed bounds in a
/// snapshot are swapped the same way as constructed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawTimeframe")]
pub struct Timeframe {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

/// Wire shape of a timeframe, before bounds are normalized
#[derive(Deserialize)]
struct RawTimeframe {
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
}

impl From<RawTimeframe> for Timeframe {
    fn from(raw: RawTimeframe) -> Self {
        Timeframe::new(raw.start, raw.end, raw.granularity)
    }
}

impl Timeframe {
    /// Build a timeframe, swapping the bounds if they are reversed.
    pub fn new(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Timeframe {
            start,
            end,
            granularity,
        }
    }

    pub fn year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Timeframe::new(start, end, Granularity::Year))
    }

    /// `half` is 1 or 2.
    pub fn half(year: i32, half: u32) -> Option<Self> {
        if !(1..=2).contains(&half) {
            return None;
        }
        let (start, end) = month_span(year, (half - 1) * 6 + 1, 6)?;
        Some(Timeframe::new(start, end, Granularity::Half))
    }

    /// `quarter` is 1 through 4.
    pub fn quarter(year: i32, quarter: u32) -> Option<Self> {
        if !(1..=4).contains(&quarter) {
            return None;
        }
        let (start, end) = month_span(year, (quarter - 1) * 3 + 1, 3)?;
        Some(Timeframe::new(start, end, Granularity::Quarter))
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        let (start, end) = month_span(year, month, 1)?;
        Some(Timeframe::new(start, end, Granularity::Month))
    }

    pub fn days(start: NaiveDate, end: NaiveDate) -> Self {
        Timeframe::new(start, end, Granularity::Days)
    }

    /// The calendar year containing `today`.
    pub fn current_year(today: NaiveDate) -> Self {
        Timeframe::year(today.year()).unwrap_or_else(|| Timeframe::days(today, today))
    }

    /// The quarter containing `today`.
    pub fn current_quarter(today: NaiveDate) -> Self {
        let q = (today.month() - 1) / 3 + 1;
        // month_span only fails for out-of-range years, which a valid date can't have
        Timeframe::quarter(today.year(), q).unwrap_or_else(|| Timeframe::days(today, today))
    }

    /// Closed-interval overlap: the two share at least one day.
    pub fn overlaps(&self, other: &Timeframe) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    /// Short human label: `2025`, `H1 2025`, `Q3 2025`, `Mar 2025`, or a date range.
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Year => format!("{}", self.start.year()),
            Granularity::Half => {
                format!("H{} {}", (self.start.month() - 1) / 6 + 1, self.start.year())
            }
            Granularity::Quarter => {
                format!("Q{} {}", (self.start.month() - 1) / 3 + 1, self.start.year())
            }
            Granularity::Month => self.start.format("%b %Y").to_string(),
            Granularity::Days => format!("{} \u{2013} {}", self.start, self.end),
        }
    }
}

/// First and last day of a run of `count` months starting at `month`.
fn month_span(year: i32, month: u32, count: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = start.checked_add_months(Months::new(count))?;
    Some((start, next.pred_opt()?))
}

impl Ord for Timeframe {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end.cmp(&other.end))
            .then(self.granularity.cmp(&other.granularity))
    }
}

impl PartialOrd for Timeframe {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical text form, parsed back by `FromStr`.
impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Year => write!(f, "{}", self.start.year()),
            Granularity::Half => write!(
                f,
                "{}-H{}",
                self.start.year(),
                (self.start.month() - 1) / 6 + 1
            ),
            Granularity::Quarter => write!(
                f,
                "{}-Q{}",
                self.start.year(),
                (self.start.month() - 1) / 3 + 1
            ),
            Granularity::Month => write!(f, "{}", self.start.format("%Y-%m")),
            Granularity::Days => write!(f, "{}..{}", self.start, self.end),
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Accepts `2025`, `2025-H1`, `2025-Q1`, `2025-03`, or `2025-01-05..2025-02-10`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || {
            format!(
                "invalid timeframe '{}' (expected: {})",
                s,
                "2025, 2025-H1, 2025-Q1, 2025-03, or 2025-01-05..2025-02-10"
            )
        };

        if let Some((a, b)) = s.split_once("..") {
            let start = NaiveDate::parse_from_str(a.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
            let end = NaiveDate::parse_from_str(b.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
            return Ok(Timeframe::days(start, end));
        }

        let (year_part, rest) = match s.split_once('-') {
            Some((y, r)) => (y, Some(r)),
            None => (s, None),
        };
        let year: i32 = year_part.parse().map_err(|_| invalid())?;

        let parsed = match rest {
            None => Timeframe::year(year),
            Some(r) => {
                let upper = r.to_ascii_uppercase();
                if let Some(h) = upper.strip_prefix('H') {
                    h.parse().ok().and_then(|h| Timeframe::half(year, h))
                } else if let Some(q) = upper.strip_prefix('Q') {
                    q.parse().ok().and_then(|q| Timeframe::quarter(year, q))
                } else {
                    r.parse().ok().and_then(|m| Timeframe::month(year, m))
                }
            }
        };
        parsed.ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn quarter_bounds() {
        let q1 = Timeframe::quarter(2025, 1).unwrap();
        assert_eq!(q1.start, d(2025, 1, 1));
        assert_eq!(q1.end, d(2025, 3, 31));
        let q4 = Timeframe::quarter(2024, 4).unwrap();
        assert_eq!(q4.end, d(2024, 12, 31));
        assert!(Timeframe::quarter(2025, 5).is_none());
    }

    #[test]
    fn half_and_month_bounds() {
        let h2 = Timeframe::half(2025, 2).unwrap();
        assert_eq!(h2.start, d(2025, 7, 1));
        assert_eq!(h2.end, d(2025, 12, 31));
        let feb = Timeframe::month(2024, 2).unwrap();
        assert_eq!(feb.end, d(2024, 2, 29));
        assert!(Timeframe::month(2024, 13).is_none());
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let tf = Timeframe::days(d(2025, 5, 1), d(2025, 4, 1));
        assert_eq!(tf.start, d(2025, 4, 1));
        assert_eq!(tf.end, d(2025, 5, 1));
    }

    #[test]
    fn reversed_bounds_are_swapped_when_deserialized() {
        let tf: Timeframe = serde_json::from_str(
            r#"{"start":"2025-12-31","end":"2025-01-01","granularity":"year"}"#,
        )
        .unwrap();
        assert_eq!(tf.start, d(2025, 1, 1));
        assert_eq!(tf.end, d(2025, 12, 31));
        assert!(tf.overlaps(&Timeframe::quarter(2025, 2).unwrap()));
        assert_eq!(serde_json::to_value(tf).unwrap()["start"], "2025-01-01");
    }

    #[test]
    fn overlap_is_inclusive_at_edges() {
        let q1 = Timeframe::quarter(2025, 1).unwrap();
        let q2 = Timeframe::quarter(2025, 2).unwrap();
        assert!(!q1.overlaps(&q2));
        let edge = Timeframe::days(d(2025, 3, 31), d(2025, 4, 2));
        assert!(q1.overlaps(&edge));
        assert!(q2.overlaps(&edge));
        assert!(Timeframe::year(2025).unwrap().overlaps(&q2));
    }

    #[test]
    fn ordering_by_start_then_end() {
        let year = Timeframe::year(2025).unwrap();
        let q1 = Timeframe::quarter(2025, 1).unwrap();
        let q2 = Timeframe::quarter(2025, 2).unwrap();
        let mut v = vec![q2, year, q1];
        v.sort();
        assert_eq!(v, vec![q1, year, q2]);
    }

    #[test]
    fn labels() {
        assert_eq!(Timeframe::year(2025).unwrap().label(), "2025");
        assert_eq!(Timeframe::half(2025, 1).unwrap().label(), "H1 2025");
        assert_eq!(Timeframe::quarter(2025, 3).unwrap().label(), "Q3 2025");
        assert_eq!(Timeframe::month(2025, 3).unwrap().label(), "Mar 2025");
    }

    #[test]
    fn parse_all_forms() {
        assert_eq!("2025".parse::<Timeframe>().unwrap(), Timeframe::year(2025).unwrap());
        assert_eq!(
            "2025-h2".parse::<Timeframe>().unwrap(),
            Timeframe::half(2025, 2).unwrap()
        );
        assert_eq!(
            "2025-Q1".parse::<Timeframe>().unwrap(),
            Timeframe::quarter(2025, 1).unwrap()
        );
        assert_eq!(
            "2025-03".parse::<Timeframe>().unwrap(),
            Timeframe::month(2025, 3).unwrap()
        );
        assert_eq!(
            "2025-01-05..2025-02-10".parse::<Timeframe>().unwrap(),
            Timeframe::days(d(2025, 1, 5), d(2025, 2, 10))
        );
        assert!("Q1".parse::<Timeframe>().is_err());
        assert!("2025-Q9".parse::<Timeframe>().is_err());
        assert!("2025-01-05..nope".parse::<Timeframe>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for tf in [
            Timeframe::year(2026).unwrap(),
            Timeframe::half(2026, 2).unwrap(),
            Timeframe::quarter(2026, 4).unwrap(),
            Timeframe::month(2026, 11).unwrap(),
            Timeframe::days(d(2026, 1, 2), d(2026, 1, 9)),
        ] {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn current_quarter_of_date() {
        let q = Timeframe::current_quarter(d(2026, 10, 16));
        assert_eq!(q, Timeframe::quarter(2026, 4).unwrap());
    }

    #[test]
    fn current_year_of_date() {
        let y = Timeframe::current_year(d(2026, 10, 16));
        assert_eq!(y, Timeframe::year(2026).unwrap());
        assert_eq!(y.granularity, Granularity::Year);
    }
}
