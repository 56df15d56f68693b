use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// A row is missing one of its identity fields (date, outlet, item).
    InvalidRecord { row: Option<usize>, field: &'static str },
    /// Unrecognized match policy value.
    PolicyError(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad date range, empty name, etc.).
    ConfigValidation(String),
    /// Missing required column in input data.
    MissingColumn { column: String },
    /// Date parse error.
    DateParse { row: usize, value: String },
    /// Quantity cell is neither empty nor numeric.
    QuantityParse { row: usize, column: String, value: String },
    /// Upstream status flag is not a known spelling.
    StatusParse { row: usize, value: String },
    /// IO error (file read, CSV framing, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecord { row: Some(row), field } => {
                write!(f, "row {row}: invalid record, missing '{field}'")
            }
            Self::InvalidRecord { row: None, field } => {
                write!(f, "invalid record, missing '{field}'")
            }
            Self::PolicyError(value) => write!(
                f,
                "unknown match policy \"{value}\" (expected \"closing_stock\" or \"consumption\")"
            ),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::DateParse { row, value } => {
                write!(f, "row {row}: cannot parse date '{value}'")
            }
            Self::QuantityParse { row, column, value } => {
                write!(f, "row {row}: cannot parse quantity '{value}' in column '{column}'")
            }
            Self::StatusParse { row, value } => {
                write!(f, "row {row}: unknown stock status '{value}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl ReconError {
    /// Attach the input row index to a record error.
    pub fn at_row(self, index: usize) -> Self {
        match self {
            Self::InvalidRecord { field, .. } => Self::InvalidRecord { row: Some(index), field },
            other => other,
        }
    }
}
