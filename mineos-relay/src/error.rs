use thiserror::Error;

/// Routing controller error types
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    
    #[error("No downstream available")]
    NoDownstream,
    
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Router shutdown")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, RouterError>;
