use crate::config::ConfigError;
use crate::db::loader::LoadError;
use crate::export::ExportError;
use crate::hh::HhError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Csv(csv::Error),
    Scrape(HhError),
    Export(ExportError),
    Load(LoadError),
    Db(sqlx::Error),
    /// Pipeline preconditions: missing export files, refused prompts, etc.
    Pipeline(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Csv(err) => write!(f, "csv error: {}", err),
            AppError::Scrape(err) => write!(f, "scrape error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Load(err) => write!(f, "load error: {}", err),
            AppError::Db(err) => write!(f, "database error: {}", err),
            AppError::Pipeline(msg) => write!(f, "pipeline error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Csv(err) => Some(err),
            AppError::Scrape(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Load(err) => Some(err),
            AppError::Db(err) => Some(err),
            AppError::Pipeline(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<HhError> for AppError {
    fn from(value: HhError) -> Self {
        Self::Scrape(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<LoadError> for AppError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self::Db(value)
    }
}
