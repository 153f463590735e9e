use std::env;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use bracket_driver_api::tournaments::groups::AddTeamsRoute;
use bracket_driver_api::tournaments::BracketType;
use bracket_driver_core::{
    Classifier, DetectorOptions, ProvisionOptions, SimulatorOptions, TournamentGenerator,
};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Overwrites every field whose variable is set and parses. Unparsable values are ignored.
macro_rules! from_environment {
    ($config:expr, $lookup:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            {
                if let Some(value) = $lookup($key) {
                    if let Ok(value) = value.parse() {
                        $config.$name = value;
                    }
                }
            }
        )*
    }};
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub loglevel: LevelFilter,
    /// Base URL of the bracket service.
    pub host: String,
    /// Teams per tournament.
    pub teams: u32,
    pub poll_interval: Seconds,
    pub poll_timeout: Seconds,
    pub stable_checks: u32,
    pub skip_scored: bool,
    pub max_rounds: u32,
    pub match_delay: Seconds,
    pub bracket_type: BracketType,
    pub add_teams: AddTeamsRoute,
    pub one_by_one: bool,
}

impl Config {
    pub async fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let mut file = File::open(path).await?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;

        Ok(toml::from_slice(&buf)?)
    }

    pub fn with_environment(self) -> Self {
        self.with_vars(|key| env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn with_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        from_environment!(
            self,
            lookup,
            "LOADTEST_LOGLEVEL",
            loglevel,
            "TOURNAMENT_BASE_URL",
            host,
            "LOADTEST_TEAMS",
            teams,
            "LOADTEST_POLL_INTERVAL",
            poll_interval,
            "LOADTEST_POLL_TIMEOUT",
            poll_timeout,
            "LOADTEST_STABLE_CHECKS",
            stable_checks,
            "LOADTEST_SKIP_SCORED",
            skip_scored,
            "LOADTEST_MAX_ROUNDS",
            max_rounds,
            "LOADTEST_MATCH_DELAY",
            match_delay,
            "LOADTEST_BRACKET_TYPE",
            bracket_type,
            "LOADTEST_ADD_TEAMS",
            add_teams,
            "LOADTEST_ONE_BY_ONE",
            one_by_one,
        );

        self
    }

    /// Rejects values no run can succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "host",
                reason: format!("'{}' is not an http(s) URL", self.host),
            });
        }

        if self.teams < 2 {
            return Err(ConfigError::InvalidValue {
                field: "teams",
                reason: String::from("a bracket needs at least 2 teams"),
            });
        }

        if self.stable_checks == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stable_checks",
                reason: String::from("must be at least 1"),
            });
        }

        if self.poll_interval.as_duration().is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval",
                reason: String::from("must be greater than 0"),
            });
        }

        Ok(())
    }

    pub fn generator(&self) -> TournamentGenerator {
        TournamentGenerator {
            name: None,
            bracket_type: Some(self.bracket_type),
            teams: self.teams,
        }
    }

    pub fn provision_options(&self) -> ProvisionOptions {
        ProvisionOptions {
            route: self.add_teams,
            one_by_one: self.one_by_one,
        }
    }

    pub fn simulator_options(&self) -> SimulatorOptions {
        SimulatorOptions {
            classifier: Classifier::new(self.skip_scored),
            max_rounds: self.max_rounds,
            match_delay: self.match_delay.as_duration(),
        }
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            timeout: self.poll_timeout.as_duration(),
            poll_interval: self.poll_interval.as_duration(),
            stable_checks: self.stable_checks,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: LevelFilter::Info,
            host: String::from("http://localhost:8080"),
            teams: 32,
            poll_interval: Seconds(Duration::from_secs(1)),
            poll_timeout: Seconds(Duration::from_secs(120)),
            stable_checks: 5,
            skip_scored: true,
            max_rounds: 50,
            match_delay: Seconds(Duration::from_millis(100)),
            bracket_type: BracketType::DoubleElimination,
            add_teams: AddTeamsRoute::Group,
            one_by_one: false,
        }
    }
}

/// A non-negative duration written as fractional seconds (`0.5`, `120`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Seconds(pub Duration);

impl Seconds {
    #[inline]
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl TryFrom<f64> for Seconds {
    type Error = InvalidSeconds;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Duration::try_from_secs_f64(value)
            .map(Self)
            .map_err(|_| InvalidSeconds(value.to_string()))
    }
}

impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.0.as_secs_f64()
    }
}

impl FromStr for Seconds {
    type Err = InvalidSeconds;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| InvalidSeconds(s.to_owned()))?;
        Self::try_from(value).map_err(|_| InvalidSeconds(s.to_owned()))
    }
}

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs_f64())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid number of seconds: {0}")]
pub struct InvalidSeconds(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
