//! Game configuration.
//!
//! Every phase length is configurable so hosts can run shortened games.
//! Configuration is read from a JSON file; missing fields keep their
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors raised while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Timing and seeding for one game instance. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Delay between dealing roles and the first night.
    pub start_delay_ms: u64,
    /// Length of the night action window.
    pub night_ms: u64,
    /// Open discussion before nominations.
    pub day_ms: u64,
    /// Longest a nomination vote may run.
    pub nomination_ms: u64,
    /// How often nominations are tallied.
    pub poll_ms: u64,
    /// The accused's defense speech.
    pub defense_ms: u64,
    /// The guilty/innocent window.
    pub verdict_ms: u64,
    /// Pause between a verdict and nightfall.
    pub post_verdict_ms: u64,
    /// How long a finished game lingers before it resets.
    pub end_grace_ms: u64,
    /// Shuffle seed (0 = use entropy).
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: 10_000,
            night_ms: 30_000,
            day_ms: 60_000,
            nomination_ms: 60_000,
            poll_ms: 1_000,
            defense_ms: 20_000,
            verdict_ms: 20_000,
            post_verdict_ms: 10_000,
            end_grace_ms: 30_000,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Rejects windows that would make the game spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("night_ms", self.night_ms),
            ("day_ms", self.day_ms),
            ("nomination_ms", self.nomination_ms),
            ("poll_ms", self.poll_ms),
            ("defense_ms", self.defense_ms),
            ("verdict_ms", self.verdict_ms),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(())
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    pub fn night(&self) -> Duration {
        Duration::from_millis(self.night_ms)
    }

    pub fn day(&self) -> Duration {
        Duration::from_millis(self.day_ms)
    }

    pub fn nomination(&self) -> Duration {
        Duration::from_millis(self.nomination_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn defense(&self) -> Duration {
        Duration::from_millis(self.defense_ms)
    }

    pub fn verdict(&self) -> Duration {
        Duration::from_millis(self.verdict_ms)
    }

    pub fn post_verdict(&self) -> Duration {
        Duration::from_millis(self.post_verdict_ms)
    }

    pub fn end_grace(&self) -> Duration {
        Duration::from_millis(self.end_grace_ms)
    }
}

/// Renders a window length for chat, e.g. "30 seconds" or "1 minute".
pub fn spoken(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_classic_timings() {
        let config = GameConfig::default();
        assert_eq!(config.start_delay(), Duration::from_secs(10));
        assert_eq!(config.night(), Duration::from_secs(30));
        assert_eq!(config.day(), Duration::from_secs(60));
        assert_eq!(config.nomination(), Duration::from_secs(60));
        assert_eq!(config.poll(), Duration::from_secs(1));
        assert_eq!(config.defense(), Duration::from_secs(20));
        assert_eq!(config.verdict(), Duration::from_secs(20));
        assert_eq!(config.post_verdict(), Duration::from_secs(10));
        assert_eq!(config.end_grace(), Duration::from_secs(30));
        assert_eq!(config.seed, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "night_ms": 500, "seed": 42 }"#).unwrap();
        assert_eq!(config.night_ms, 500);
        assert_eq!(config.seed, 42);
        assert_eq!(config.day_ms, 60_000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = GameConfig::from_json(r#"{ "nigth_ms": 500 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_poll_is_rejected() {
        let err = GameConfig::from_json(r#"{ "poll_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration("poll_ms")));
        assert_eq!(err.to_string(), "poll_ms must be greater than zero");
    }

    #[test]
    fn zero_delays_are_allowed() {
        let config =
            GameConfig::from_json(r#"{ "start_delay_ms": 0, "post_verdict_ms": 0 }"#).unwrap();
        assert_eq!(config.start_delay(), Duration::ZERO);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "day_ms": 1234 }}"#).unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.day_ms, 1234);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = GameConfig::load(Path::new("/nonexistent/nightfall.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn spoken_durations() {
        assert_eq!(spoken(Duration::from_secs(30)), "30 seconds");
        assert_eq!(spoken(Duration::from_secs(60)), "1 minute");
        assert_eq!(spoken(Duration::from_secs(120)), "2 minutes");
        assert_eq!(spoken(Duration::from_secs(1)), "1 second");
        assert_eq!(spoken(Duration::from_millis(200)), "0 seconds");
    }
}
