use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ClientError {
    Validation(String),
    Transport(String),
    Export(String),
    Io(String),
    Config(String),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Transport(_) => "transport_error",
            Self::Export(_) => "export_error",
            Self::Io(_) => "io_error",
            Self::Config(_) => "config_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Transport(message)
            | Self::Export(message)
            | Self::Io(message)
            | Self::Config(message) => message,
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(error: url::ParseError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<author_rows::ExportError> for ClientError {
    fn from(error: author_rows::ExportError) -> Self {
        Self::Export(error.to_string())
    }
}

impl From<std::num::ParseIntError> for ClientError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::Config(error.to_string())
    }
}
