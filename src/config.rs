use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub alphabet: AlphabetConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum brute-force candidate length
    pub max_length: usize,

    /// Shuffle the alphabet once before brute force starts
    #[serde(default)]
    pub shuffle: bool,

    /// Worker threads for hash-and-compare (1 = sequential)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Candidates handed to the worker pool at a time
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Optional ceiling on candidates tested; 0 disables it
    #[serde(default)]
    pub max_candidates: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphabetConfig {
    /// Custom character set; empty means the full 94-character library
    #[serde(default)]
    pub charset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Default rule-selection string for dictionary mode
    /// ('*' = all rules, '0' = baseline)
    pub selection: String,
}

fn default_workers() -> usize {
    1
}

fn default_batch_size() -> usize {
    1024
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.max_length == 0 {
            anyhow::bail!("search.max_length must be at least 1");
        }

        // 94^12 is already far beyond anything a single machine finishes;
        // treat bigger values as a typo.
        if self.search.max_length > 12 {
            anyhow::bail!("search.max_length is too high (>{})", 12);
        }

        if self.search.workers == 0 {
            anyhow::bail!("search.workers must be at least 1");
        }
        if self.search.workers > 256 {
            anyhow::bail!("search.workers is too high (>{})", 256);
        }

        if self.search.batch_size == 0 {
            anyhow::bail!("search.batch_size must be at least 1");
        }

        if !self.alphabet.charset.is_empty() {
            let chars: Vec<char> = self.alphabet.charset.chars().collect();
            for (i, c) in chars.iter().enumerate() {
                if chars[..i].contains(c) {
                    anyhow::bail!("alphabet.charset repeats character {:?}", c);
                }
            }
        }

        Ok(())
    }

    /// Ceiling as the search driver wants it: `None` when disabled.
    pub fn candidate_ceiling(&self) -> Option<u64> {
        (self.search.max_candidates > 0).then_some(self.search.max_candidates)
    }

    /// Create default configuration
    pub fn default_toml() -> String {
        r#"
[search]
max_length = 6
shuffle = false
workers = 1
batch_size = 1024
max_candidates = 0

[alphabet]
# Empty charset means lowercase + uppercase + digits + punctuation (94 chars)
charset = ""

[rules]
# One character per mangling rule, '*' for all, '0' for none:
#   c cap_ends   C capall    d duplicate  D cap_dupe  R cap_rev
#   l lowerall   n numbers   p plural     r reverse   s split
#   t tense      T trunc_app y years
selection = "*"
"#
        .to_string()
    }

    /// Save default config to file
    pub fn save_default(path: &str) -> Result<()> {
        fs::write(path, Self::default_toml())
            .context("Failed to write default config")?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search: SearchConfig {
                max_length: 6,
                shuffle: false,
                workers: 1,
                batch_size: 1024,
                max_candidates: 0,
            },
            alphabet: AlphabetConfig {
                charset: String::new(),
            },
            rules: RulesConfig {
                selection: "*".to_string(),
            },
        }
    }
}
