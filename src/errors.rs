use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("API error: {0}")]
    Api(#[from] gpubot_api::ApiError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Credentials were never set for this user; distinct from remote
    /// errors so the reply can tell the user what to do.
    #[error("AutoDL username and password are not set; use /user and /password first")]
    MissingCredentials,

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(String),

    #[error("INI error: {0}")]
    IniError(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
