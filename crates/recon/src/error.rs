use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, unknown vendor key, etc.).
    ConfigValidation(String),
    /// Missing required column in a canonical CSV.
    MissingColumn { file: String, column: String },
    /// A money or quantity field did not parse as exact 2-digit fixed point.
    FixedPointParse { file: String, sku: String, value: String },
    /// CSV decode/encode error.
    Csv { file: String, message: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { file, column } => {
                write!(f, "{file}: missing column '{column}'")
            }
            Self::FixedPointParse { file, sku, value } => {
                write!(f, "{file}, sku '{sku}': cannot parse amount '{value}'")
            }
            Self::Csv { file, message } => write!(f, "{file}: {message}"),
        }
    }
}

impl std::error::Error for ReconError {}
