use serde::Deserialize;
use std::time::Duration;

/// Runtime configuration loaded from `ANIREC_*` environment variables
///
/// Every field has a default, so an empty environment gives the stock AniList setup.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// AniList site root, used for availability and profile checks
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// AniList GraphQL endpoint
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Pause before every recommendation request, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// First wait after a rate-limit response; doubles on each further attempt
    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,

    /// Total attempts for one recommendation request before giving up
    #[serde(default = "default_rate_limit_max_attempts")]
    pub rate_limit_max_attempts: u32,

    /// Output file name, without the `.csv` extension
    #[serde(default = "default_output_basename")]
    pub output_basename: String,
}

fn default_site_url() -> String {
    "https://anilist.co".to_string()
}

fn default_graphql_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_rate_limit_wait_secs() -> u64 {
    65
}

fn default_rate_limit_max_attempts() -> u32 {
    3
}

fn default_output_basename() -> String {
    "recsOnFile".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            graphql_url: default_graphql_url(),
            request_delay_ms: default_request_delay_ms(),
            rate_limit_wait_secs: default_rate_limit_wait_secs(),
            rate_limit_max_attempts: default_rate_limit_max_attempts(),
            output_basename: default_output_basename(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("ANIREC_")
            .from_iter(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn rate_limit_wait(&self) -> Duration {
        Duration::from_secs(self.rate_limit_wait_secs)
    }

    /// Path of the report file, `{output_basename}.csv`
    pub fn output_path(&self) -> String {
        format!("{}.csv", self.output_basename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.site_url, "https://anilist.co");
        assert_eq!(config.graphql_url, "https://graphql.anilist.co");
        assert_eq!(config.request_delay(), Duration::from_secs(1));
        assert_eq!(config.rate_limit_wait(), Duration::from_secs(65));
        assert_eq!(config.rate_limit_max_attempts, 3);
        assert_eq!(config.output_path(), "recsOnFile.csv");
    }

    #[test]
    fn test_prefixed_overrides() {
        let vars = vec![
            ("ANIREC_REQUEST_DELAY_MS".to_string(), "250".to_string()),
            ("ANIREC_OUTPUT_BASENAME".to_string(), "mine".to_string()),
            ("REQUEST_DELAY_MS".to_string(), "9999".to_string()),
        ];
        let config = Config::from_vars(vars).unwrap();
        assert_eq!(config.request_delay_ms, 250);
        assert_eq!(config.output_path(), "mine.csv");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let vars = vec![(
            "ANIREC_RATE_LIMIT_MAX_ATTEMPTS".to_string(),
            "lots".to_string(),
        )];
        let err = Config::from_vars(vars).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
