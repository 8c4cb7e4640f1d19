pub mod config;
pub mod dataset;
pub mod fetch;
pub mod geography;
pub mod output;
pub mod resolver;
pub mod scoring;
