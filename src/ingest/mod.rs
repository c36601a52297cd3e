pub mod extract;
pub mod scraper;

pub use scraper::{IngestSummary, ProgramScraper};
