use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("Snapshot is not valid UTF-8")]
    Encoding,

    #[error("Unexpected header: {0}")]
    Header(String),

    #[error("Row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: invalid {column} value {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}
