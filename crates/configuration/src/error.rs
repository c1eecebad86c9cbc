use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or the environment could not be read or deserialized.
    #[error("Failed to read settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A setting was read but is out of range.
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}
