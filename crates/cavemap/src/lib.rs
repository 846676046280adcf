pub mod clean;
pub mod map;
mod parser;
pub mod scraper;
pub mod types;
pub mod utils;

pub use clean::{FormatError, clean_table};
pub use map::{MapOptions, MapRenderer};
pub use parser::ParseError;
pub use scraper::{ScraperError, WebScraper};

pub const DEFAULT_URL: &str = "https://en.wikipedia.org/wiki/List_of_deepest_caves";
