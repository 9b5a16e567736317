use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::pools::{PoolCalendar, PoolRegistry};
use super::types::{AcademicCalendarType, UnknownCalendarReference};

/// Day and month of a calendar boundary, relative to the academic year it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateOffset {
    pub day: u32,
    pub month: u32,
    pub year_delta: i32,
}

impl DateOffset {
    pub const fn new(day: u32, month: u32, year_delta: i32) -> Self {
        Self {
            day,
            month,
            year_delta,
        }
    }

    pub fn resolve(self, academic_year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(academic_year + self.year_delta, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "offset")]
pub enum WindowEnd {
    /// Closes the day before the next academic year's window opens.
    DayBeforeNext,
    Fixed(DateOffset),
    Open,
}

/// Opening period of one pool for one academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub reference: AcademicCalendarType,
    pub year: i32,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl CalendarEntry {
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.start <= today && self.end.map_or(true, |end| today <= end)
    }
}

impl PoolCalendar {
    /// Concrete entry of this pool for `academic_year`.
    pub fn entry_for(&self, academic_year: i32) -> Option<CalendarEntry> {
        let start = self.cutover().resolve(academic_year)?;
        let end = match self.end() {
            WindowEnd::DayBeforeNext => {
                Some(self.cutover().resolve(academic_year + 1)? - Duration::days(1))
            }
            WindowEnd::Fixed(offset) => Some(offset.resolve(academic_year)?),
            WindowEnd::Open => None,
        };

        Some(CalendarEntry {
            reference: self.kind(),
            year: academic_year,
            start,
            end,
        })
    }
}

/// Pool references paired with the academic years they are open for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenPools {
    entries: BTreeSet<(AcademicCalendarType, i32)>,
}

impl OpenPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pool: AcademicCalendarType, year: i32) {
        self.entries.insert((pool, year));
    }

    pub fn contains(&self, pool: AcademicCalendarType, year: i32) -> bool {
        self.entries.contains(&(pool, year))
    }

    /// Open for at least one academic year.
    pub fn is_open(&self, pool: AcademicCalendarType) -> bool {
        self.entries.iter().any(|(kind, _)| *kind == pool)
    }

    pub fn years(&self, pool: AcademicCalendarType) -> Vec<i32> {
        self.entries
            .iter()
            .filter(|(kind, _)| *kind == pool)
            .map(|(_, year)| *year)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AcademicCalendarType, i32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(AcademicCalendarType, i32)> for OpenPools {
    fn from_iter<T: IntoIterator<Item = (AcademicCalendarType, i32)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug)]
pub enum CalendarImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownReference(UnknownCalendarReference),
    InvalidDate { field: &'static str, value: String },
    InvertedWindow { reference: AcademicCalendarType, year: i32 },
}

impl std::fmt::Display for CalendarImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarImportError::Io(err) => write!(f, "failed to read calendar export: {}", err),
            CalendarImportError::Csv(err) => write!(f, "invalid calendar CSV data: {}", err),
            CalendarImportError::UnknownReference(err) => write!(f, "{}", err),
            CalendarImportError::InvalidDate { field, value } => {
                write!(f, "invalid {} '{}', expected YYYY-MM-DD", field, value)
            }
            CalendarImportError::InvertedWindow { reference, year } => write!(
                f,
                "calendar entry {} for {} ends before it starts",
                reference, year
            ),
        }
    }
}

impl std::error::Error for CalendarImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalendarImportError::Io(err) => Some(err),
            CalendarImportError::Csv(err) => Some(err),
            CalendarImportError::UnknownReference(err) => Some(err),
            CalendarImportError::InvalidDate { .. } | CalendarImportError::InvertedWindow { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for CalendarImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CalendarImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<UnknownCalendarReference> for CalendarImportError {
    fn from(err: UnknownCalendarReference) -> Self {
        Self::UnknownReference(err)
    }
}

#[derive(Debug, Deserialize)]
struct CalendarRow {
    reference: String,
    year: i32,
    start_date: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    end_date: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, CalendarImportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CalendarImportError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}

/// Academic calendar read model: one entry per (pool, academic year).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcademicCalendar {
    entries: BTreeMap<(AcademicCalendarType, i32), CalendarEntry>,
}

impl AcademicCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed entries for every registered pool from `current_year - 1` to `current_year + 6`.
    pub fn generate(registry: &PoolRegistry, current_year: i32) -> Self {
        let mut calendar = Self::new();
        for pool in registry.all_pools() {
            for year in (current_year - 1)..=(current_year + 6) {
                if let Some(entry) = pool.entry_for(year) {
                    calendar.insert(entry);
                }
            }
        }
        calendar
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CalendarImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse `reference,year,start_date,end_date` rows; an empty end date leaves the window open.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CalendarImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut calendar = Self::new();

        for record in csv_reader.deserialize::<CalendarRow>() {
            let row = record?;
            let reference: AcademicCalendarType = row.reference.parse()?;
            let start = parse_date("start_date", &row.start_date)?;
            let end = row
                .end_date
                .as_deref()
                .map(|value| parse_date("end_date", value))
                .transpose()?;

            if matches!(end, Some(end) if end < start) {
                return Err(CalendarImportError::InvertedWindow {
                    reference,
                    year: row.year,
                });
            }

            calendar.insert(CalendarEntry {
                reference,
                year: row.year,
                start,
                end,
            });
        }

        Ok(calendar)
    }

    pub fn insert(&mut self, entry: CalendarEntry) {
        self.entries.insert((entry.reference, entry.year), entry);
    }

    /// Entries from `overrides` replace the matching (pool, year) entries.
    pub fn merge(&mut self, overrides: AcademicCalendar) {
        self.entries.extend(overrides.entries);
    }

    pub fn entry(&self, reference: AcademicCalendarType, year: i32) -> Option<&CalendarEntry> {
        self.entries.get(&(reference, year))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CalendarEntry> {
        self.entries.values()
    }

    pub fn open_pools(&self, today: NaiveDate) -> OpenPools {
        self.entries
            .values()
            .filter(|entry| entry.is_open(today))
            .map(|entry| (entry.reference, entry.year))
            .collect()
    }
}

/// Academic years probed by the resolver, priority tier first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationYears {
    pub priority: Vec<i32>,
    pub regular: Vec<i32>,
}

/// Derives the probed years from the academic year containing `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoverYearPolicy {
    switch_day: u32,
    switch_month: u32,
}

impl CutoverYearPolicy {
    pub const fn new(switch_day: u32, switch_month: u32) -> Self {
        Self {
            switch_day,
            switch_month,
        }
    }

    pub fn reference_year(&self, today: NaiveDate) -> i32 {
        if (today.month(), today.day()) >= (self.switch_month, self.switch_day) {
            today.year()
        } else {
            today.year() - 1
        }
    }

    pub fn years_for_calculation(&self, today: NaiveDate) -> CalculationYears {
        let reference = self.reference_year(today);
        CalculationYears {
            priority: vec![reference],
            regular: vec![reference, reference + 1],
        }
    }
}

impl Default for CutoverYearPolicy {
    fn default() -> Self {
        Self::new(14, 9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn day_before_next_ends_before_following_cutover() {
        let vip = PoolCalendar::standard(AcademicCalendarType::AdmissionPoolVip);
        let entry = vip.entry_for(2024).expect("entry");
        assert_eq!(entry.start, date(2023, 11, 1));
        assert_eq!(entry.end, Some(date(2024, 10, 31)));
    }

    #[test]
    fn fixed_windows_follow_their_offsets() {
        let reorientation =
            PoolCalendar::standard(AcademicCalendarType::AdmissionPoolExternalReorientation)
                .entry_for(2024)
                .expect("entry");
        assert_eq!(reorientation.start, date(2024, 11, 1));
        assert_eq!(reorientation.end, Some(date(2025, 2, 15)));

        let foreign =
            PoolCalendar::standard(AcademicCalendarType::AdmissionPoolHue5ForeignResidency)
                .entry_for(2024)
                .expect("entry");
        assert_eq!(foreign.start, date(2023, 5, 1));
        assert_eq!(foreign.end, Some(date(2024, 3, 31)));
    }

    #[test]
    fn generate_covers_previous_year_through_six_ahead() {
        let calendar = AcademicCalendar::generate(&PoolRegistry::standard(), 2024);
        assert_eq!(calendar.entries().count(), 13 * 8);
        assert!(calendar
            .entry(AcademicCalendarType::AdmissionPoolVip, 2023)
            .is_some());
        assert!(calendar
            .entry(AcademicCalendarType::AdmissionPoolVip, 2030)
            .is_some());
        assert!(calendar
            .entry(AcademicCalendarType::AdmissionPoolVip, 2031)
            .is_none());
    }

    #[test]
    fn open_pools_reflect_today() {
        let calendar = AcademicCalendar::generate(&PoolRegistry::standard(), 2024);
        let open = calendar.open_pools(date(2024, 10, 17));
        assert!(open.contains(AcademicCalendarType::AdmissionPoolExternalEnrollmentChange, 2024));
        assert!(open.contains(AcademicCalendarType::AdmissionPoolVip, 2024));
        assert!(!open.contains(AcademicCalendarType::AdmissionPoolVip, 2025));
        assert!(!open.is_open(AcademicCalendarType::AdmissionPoolExternalReorientation));
        assert!(open.contains(AcademicCalendarType::AdmissionPoolUe5NonBelgian, 2025));
    }

    #[test]
    fn csv_overrides_replace_generated_entries() {
        let csv = "reference,year,start_date,end_date\n\
                   ADMISSION_POOL_NON_RESIDENT_QUOTA,2024,2024-10-01,\n\
                   ADMISSION_POOL_VIP,2025,2024-10-01,2024-10-31\n";
        let overrides = AcademicCalendar::from_reader(Cursor::new(csv)).expect("parse csv");

        let mut calendar = AcademicCalendar::generate(&PoolRegistry::standard(), 2024);
        calendar.merge(overrides);

        let open = calendar.open_pools(date(2024, 10, 17));
        assert!(open.contains(AcademicCalendarType::AdmissionPoolNonResidentQuota, 2024));
        assert!(open.contains(AcademicCalendarType::AdmissionPoolVip, 2025));
        assert_eq!(
            calendar
                .entry(AcademicCalendarType::AdmissionPoolNonResidentQuota, 2024)
                .and_then(|entry| entry.end),
            None
        );
    }

    #[test]
    fn csv_rejects_unknown_references_and_inverted_windows() {
        let unknown = "reference,year,start_date,end_date\nADMISSION_POOL_MOON,2024,2024-01-01,\n";
        match AcademicCalendar::from_reader(Cursor::new(unknown)) {
            Err(CalendarImportError::UnknownReference(_)) => {}
            other => panic!("expected unknown reference, got {other:?}"),
        }

        let inverted =
            "reference,year,start_date,end_date\nADMISSION_POOL_VIP,2024,2024-05-01,2024-04-01\n";
        match AcademicCalendar::from_reader(Cursor::new(inverted)) {
            Err(CalendarImportError::InvertedWindow { year: 2024, .. }) => {}
            other => panic!("expected inverted window, got {other:?}"),
        }

        let bad_date = "reference,year,start_date,end_date\nADMISSION_POOL_VIP,2024,01/05/2024,\n";
        match AcademicCalendar::from_reader(Cursor::new(bad_date)) {
            Err(CalendarImportError::InvalidDate { field: "start_date", .. }) => {}
            other => panic!("expected invalid date, got {other:?}"),
        }
    }

    #[test]
    fn cutover_switches_mid_september() {
        let policy = CutoverYearPolicy::default();
        assert_eq!(policy.reference_year(date(2024, 9, 13)), 2023);
        assert_eq!(policy.reference_year(date(2024, 9, 14)), 2024);

        let years = policy.years_for_calculation(date(2024, 10, 17));
        assert_eq!(years.priority, vec![2024]);
        assert_eq!(years.regular, vec![2024, 2025]);
    }
}
