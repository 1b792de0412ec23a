pub mod client;
pub mod network;
pub mod scrape;
pub mod types;
