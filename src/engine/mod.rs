pub mod aggregator;
pub mod assembler;
pub mod collector;
pub mod sentiment;
pub mod tickers;
