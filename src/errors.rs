use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounselRagError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion aborted at offset {offset}: {message}")]
    Ingestion { offset: usize, message: String },

    #[error("Retry exhausted after {attempts} attempts: {message}")]
    RetryExhausted { attempts: u32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CounselRagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = CounselRagError::Config("embedding dimension must be non-zero".to_string());
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_ingestion_error_carries_offset() {
        let error = CounselRagError::Ingestion {
            offset: 3200,
            message: "upsert failed".to_string(),
        };
        assert!(error.to_string().contains("3200"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: CounselRagError = io.into();
        assert!(matches!(error, CounselRagError::Io(_)));
    }
}
