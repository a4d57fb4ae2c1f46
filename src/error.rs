use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("not enough records to build a timetable: found {found}, need at least 2")]
    InsufficientData { found: usize },
    #[error("not enough candidates to select from: found {found}, need at least 2")]
    InsufficientCandidates { found: usize },
    #[error("line {line}: expected 3 comma-separated fields (subject,teacher,class), found {fields}")]
    MalformedRecord { line: u64, fields: usize },
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
    #[error("field `{field}` must not contain commas or line breaks: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("slot {slot} is outside 1..=5")]
    InvalidSlot { slot: u8 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
