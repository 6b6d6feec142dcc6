/// All entity identifiers are UUIDs, caller-supplied or generated with v4.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Star amounts (rewards, costs, balances) are whole numbers.
pub type Stars = i64;
