/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Planning-level dates (timeline placement, delivery estimates) carry no
/// time-of-day component.
pub type PlanDate = chrono::NaiveDate;
