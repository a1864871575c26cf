use time::Duration;

use super::parse_var;
use crate::error::AppError;

/// Knobs for ranking views, on-submit trimming and scheduled pruning.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    pub keep_top: usize,
    pub context_range: usize,
    pub older_keep_top: usize,
    pub archive_keep_top: usize,
    pub older_periods: u32,
    pub cleanup_threshold: u64,
    pub cleanup_probability: f64,
    pub cleanup_batch_size: u64,
    pub fetch_limit: u64,
    pub pin_recent: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            keep_top: 200,
            context_range: 10,
            older_keep_top: 50,
            archive_keep_top: 10,
            older_periods: 2,
            cleanup_threshold: 1000,
            cleanup_probability: 0.05,
            cleanup_batch_size: 50,
            fetch_limit: 500,
            pin_recent: Duration::hours(24),
        }
    }
}

impl RankingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let d = Self::default();
        let cfg = Self {
            keep_top: parse_var("RANKING_KEEP_TOP", d.keep_top)?,
            context_range: parse_var("RANKING_CONTEXT_RANGE", d.context_range)?,
            older_keep_top: parse_var("RANKING_OLDER_KEEP_TOP", d.older_keep_top)?,
            archive_keep_top: parse_var("RANKING_ARCHIVE_KEEP_TOP", d.archive_keep_top)?,
            older_periods: parse_var("RANKING_OLDER_PERIODS", d.older_periods)?,
            cleanup_threshold: parse_var("RANKING_CLEANUP_THRESHOLD", d.cleanup_threshold)?,
            cleanup_probability: parse_var(
                "RANKING_CLEANUP_PROBABILITY",
                d.cleanup_probability,
            )?,
            cleanup_batch_size: parse_var("RANKING_CLEANUP_BATCH_SIZE", d.cleanup_batch_size)?,
            fetch_limit: parse_var("RANKING_FETCH_LIMIT", d.fetch_limit)?,
            pin_recent: Duration::hours(parse_var("RANKING_PIN_RECENT_HOURS", 24i64)?),
        };
        if !(0.0..=1.0).contains(&cfg.cleanup_probability) {
            return Err(AppError::config(
                "RANKING_CLEANUP_PROBABILITY must be within 0.0..=1.0",
            ));
        }
        if cfg.keep_top == 0 {
            return Err(AppError::config("RANKING_KEEP_TOP must be at least 1"));
        }
        Ok(cfg)
    }
}

/// Session expiry and scheduler cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionConfig {
    pub session_ttl: Duration,
    pub interval: Duration,
    pub ranking: RankingConfig,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            interval: Duration::hours(24),
            ranking: RankingConfig::default(),
        }
    }
}

impl RetentionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let ttl_hours: i64 = parse_var("RETENTION_SESSION_TTL_HOURS", 24)?;
        let interval_hours: i64 = parse_var("RETENTION_INTERVAL_HOURS", 24)?;
        if ttl_hours <= 0 || interval_hours <= 0 {
            return Err(AppError::config(
                "RETENTION_SESSION_TTL_HOURS and RETENTION_INTERVAL_HOURS must be positive",
            ));
        }
        Ok(Self {
            session_ttl: Duration::hours(ttl_hours),
            interval: Duration::hours(interval_hours),
            ranking: RankingConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn defaults_match_env_free_load() {
        for var in [
            "RETENTION_SESSION_TTL_HOURS",
            "RETENTION_INTERVAL_HOURS",
            "RANKING_KEEP_TOP",
            "RANKING_CLEANUP_PROBABILITY",
        ] {
            std::env::remove_var(var);
        }
        assert_eq!(RetentionConfig::from_env().unwrap(), RetentionConfig::default());
    }

    #[test]
    #[serial]
    fn probability_out_of_range_is_rejected() {
        std::env::set_var("RANKING_CLEANUP_PROBABILITY", "1.5");
        assert!(RankingConfig::from_env().is_err());
        std::env::remove_var("RANKING_CLEANUP_PROBABILITY");
    }

    #[test]
    #[serial]
    fn ttl_override() {
        std::env::set_var("RETENTION_SESSION_TTL_HOURS", "6");
        let cfg = RetentionConfig::from_env().unwrap();
        assert_eq!(cfg.session_ttl, Duration::hours(6));
        std::env::remove_var("RETENTION_SESSION_TTL_HOURS");
    }
}
