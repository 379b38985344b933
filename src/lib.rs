// lib.rs - Ettubrute password recovery library

pub mod config;
pub mod digest;
pub mod enumerate;
pub mod mangle;
pub mod search;
pub mod stats;

// Re-exports for convenience
pub use config::Config;
pub use digest::TargetDigest;
pub use enumerate::{Alphabet, Enumerator, Step};
pub use mangle::{Rule, RuleSet};
pub use search::{SearchDriver, SearchOptions, SearchOutcome};
pub use stats::Statistics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum CrackError {
        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Invalid digest format: {0}")]
        InvalidDigestFormat(String),

        #[error("Enumerator state error: {0}")]
        State(String),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, CrackError>;
}

/// Utilities module
pub mod utils {

    /// Format duration in human-readable format
    pub fn format_duration(seconds: f64) -> String {
        if seconds < 60.0 {
            format!("{:.1}s", seconds)
        } else if seconds < 3600.0 {
            format!("{:.1}m", seconds / 60.0)
        } else if seconds < 86400.0 {
            format!("{:.1}h", seconds / 3600.0)
        } else {
            format!("{:.1}d", seconds / 86400.0)
        }
    }

    /// Format number with thousands separator
    pub fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();
        for (i, c) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result.chars().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(utils::format_duration(30.0), "30.0s");
        assert_eq!(utils::format_duration(120.0), "2.0m");
        assert_eq!(utils::format_duration(7200.0), "2.0h");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(utils::format_number(1000), "1,000");
        assert_eq!(utils::format_number(1234567), "1,234,567");
    }
}
