use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForkRankError {
    #[error("github error: {0}")]
    GitHub(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected page content: {0}")]
    Scrape(String),

    #[error("invalid repository {0:?}: expected owner/name")]
    InvalidRepository(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ForkRankError>;
