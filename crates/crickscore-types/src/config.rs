//! Configuration types for the scoring service and tournaments.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CrickscoreError, Result, constants};

/// League points awarded per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsConfig {
    pub win: u32,
    pub tie: u32,
    pub no_result: u32,
    pub loss: u32,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            win: constants::POINTS_WIN,
            tie: constants::POINTS_TIE,
            no_result: constants::POINTS_NO_RESULT,
            loss: constants::POINTS_LOSS,
        }
    }
}

/// Configuration for a scoring service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// How long a writer waits for a match or tournament lock.
    pub lock_timeout_ms: u64,
    /// Ball marks kept in the current-over trace.
    pub over_trace_capacity: usize,
    /// Points table configuration for new tournaments.
    pub points: PointsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: constants::DEFAULT_LOCK_TIMEOUT_MS,
            over_trace_capacity: constants::DEFAULT_OVER_TRACE_CAPACITY,
            points: PointsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse and validate a JSON config document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| CrickscoreError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lock_timeout_ms == 0 {
            return Err(CrickscoreError::Configuration(
                "lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.over_trace_capacity == 0 {
            return Err(CrickscoreError::Configuration(
                "over_trace_capacity must be > 0".to_string(),
            ));
        }
        if self.points.win < self.points.tie || self.points.tie < self.points.loss {
            return Err(CrickscoreError::Configuration(
                "points must satisfy win >= tie >= loss".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_defaults() {
        let p = PointsConfig::default();
        assert_eq!((p.win, p.tie, p.no_result, p.loss), (2, 1, 1, 0));
    }

    #[test]
    fn service_config_defaults_validate() {
        let cfg = ServiceConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.lock_timeout().as_millis(), 250);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let cfg = ServiceConfig::from_json_str(r#"{"lock_timeout_ms": 1000}"#).unwrap();
        assert_eq!(cfg.lock_timeout_ms, 1000);
        assert_eq!(cfg.over_trace_capacity, constants::DEFAULT_OVER_TRACE_CAPACITY);
        assert_eq!(cfg.points, PointsConfig::default());
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ServiceConfig::from_json_str(r#"{"lock_timeout_ms": 0}"#).unwrap_err();
        assert!(matches!(err, CrickscoreError::Configuration(_)));
    }

    #[test]
    fn inverted_points_rejected() {
        let mut cfg = ServiceConfig::default();
        cfg.points.tie = 5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = ServiceConfig::from_json_str("{not json").unwrap_err();
        assert!(format!("{err}").starts_with("CS_ERR_902"));
    }
}
