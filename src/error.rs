use std::error::Error as StdError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Configuration error for {parameter}: {message}")]
    ConfigurationError {
        message: String,
        parameter: String,
    },

    #[error("Initialization error: {message}")]
    InitializationError {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("Processing error: {message}")]
    ProcessingError {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Failures reported by the Hugging Face Hub client (auth, missing repo, network)
    #[error(transparent)]
    Hub(#[from] hf_hub::api::sync::ApiError),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error("{0}")]
    Tokenizer(#[from] tokenizers::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::ConfigurationError {
            message: message.into(),
            parameter: parameter.into(),
        }
    }
}

/// One-line rendering of an error and its sources. A source whose message is
/// already part of the text so far is skipped, so wrapped hub errors print once.
pub fn report(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !message.is_empty() && !text.contains(&message) {
            text.push_str(": ");
            text.push_str(&message);
        }
        source = cause.source();
    }
    text
}

/// Extension trait for error classification
pub trait ErrorExt {
    fn is_configuration(&self) -> bool;
    fn exit_code(&self) -> u8;
}

impl ErrorExt for EngineError {
    fn is_configuration(&self) -> bool {
        matches!(self, EngineError::ConfigurationError { .. })
    }

    fn exit_code(&self) -> u8 {
        if self.is_configuration() {
            2
        } else {
            1
        }
    }
}
