/// All backend primary keys are integer serials.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar date without a time component (project start/end dates).
pub type Date = chrono::NaiveDate;
