/// Task identifiers are assigned by the submitting client.
pub type TaskId = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
