use crate::clean::{FormatError, clean_table};
use crate::parser::{ParseError, parse_cave_table};
use crate::types::{CleanRecord, RawRow};

use reqwest::Client;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Failed to read page: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("Format error: {0}")]
    FormatError(#[from] FormatError),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch_cave_table(&self, url: &str) -> Result<Vec<RawRow>, ScraperError> {
        log::info!("Fetching cave table from {}...", url);
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_cave_table(&html, url)?)
    }

    pub async fn fetch_clean_records(&self, url: &str) -> Result<Vec<CleanRecord>, ScraperError> {
        let rows = self.fetch_cave_table(url).await?;
        Ok(clean_table(&rows)?)
    }
}

/// Reads a previously saved copy of the page. Links resolve as if it had been
/// fetched from [`DEFAULT_URL`](crate::DEFAULT_URL).
pub fn load_cave_table(path: impl AsRef<Path>) -> Result<Vec<RawRow>, ScraperError> {
    let path = path.as_ref();
    log::info!("Reading cave table from {}...", path.display());
    let html = std::fs::read_to_string(path)?;
    Ok(parse_cave_table(&html, crate::DEFAULT_URL)?)
}

pub fn load_clean_records(path: impl AsRef<Path>) -> Result<Vec<CleanRecord>, ScraperError> {
    let rows = load_cave_table(path)?;
    Ok(clean_table(&rows)?)
}
