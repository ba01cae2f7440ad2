/// All row primary keys are server-assigned UUIDs. Clients never mint ids.
pub type RowId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
