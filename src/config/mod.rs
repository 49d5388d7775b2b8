//! Configuration module for Sumi-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use sumi_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Page budget per domain: {}", config.crawler.max_pages_per_domain);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetcherConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
