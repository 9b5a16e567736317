//! Admission pools, their eligibility rules and the academic calendar they open in.

mod pools;
mod types;
mod window;

pub use pools::{is_quota_non_resident, PoolCalendar, PoolContext, PoolRegistry, UncoveredTrainingType};
pub use types::{
    AcademicCalendarType, ConditionAccess, TrainingType, UnknownCalendarReference,
    BELGIAN_ACCESS_DIPLOMAS, BE_ISO_CODE, PLUS_5_ISO_CODES, SIGLES_WITH_QUOTA,
};
pub use window::{
    AcademicCalendar, CalculationYears, CalendarEntry, CalendarImportError, CutoverYearPolicy,
    DateOffset, OpenPools, WindowEnd,
};
