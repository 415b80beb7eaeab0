use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer, de::Error as _};

use crate::domain::{Registry, Target, User};
use crate::infrastructure::http_fetcher::DEFAULT_USER_AGENT;
use crate::infrastructure::twilio_notifier::TwilioCredentials;

pub const CONFIG_ENV_VAR: &str = "STOCKCONF";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("$STOCKCONF is not set and no --config file was given")]
    Missing,
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot decode configuration: {0}")]
    Decode(String),
    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub twilio: TwilioCfg,
    #[serde(alias = "config")]
    pub timing: TimingCfg,
    pub targets: Vec<TargetCfg>,
    pub users: Vec<UserCfg>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioCfg {
    pub from: String,
    pub user: String,
    pub pass: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingCfg {
    /// Per-fetch timeout, seconds.
    #[serde(deserialize_with = "whole_seconds")]
    pub urltimeout: u64,
    /// Tick interval, seconds.
    #[serde(deserialize_with = "whole_seconds")]
    pub looptime: u64,
    #[serde(default)]
    pub osnotify: bool,
    #[serde(default)]
    pub useragent: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetCfg {
    pub name: String,
    pub url: String,
    #[serde(rename = "button-text", alias = "button_text")]
    pub button_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserCfg {
    pub name: String,
    pub cell: String,
    #[serde(default, deserialize_with = "whole_seconds")]
    pub cooldown: u64,
    #[serde(default)]
    pub targets: Vec<String>,
}

impl Config {
    /// Read the JSON document held in `$STOCKCONF`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(CONFIG_ENV_VAR).map_err(|_| ConfigError::Missing)?;
        if raw.trim().is_empty() {
            return Err(ConfigError::Missing);
        }
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Decode(e.to_string()))
    }

    /// Read a YAML (or JSON) file, expanding `${VAR}` placeholders first.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let raw = expand_env(&raw);
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::Decode(e.to_string()))
    }

    /// Check everything serde cannot, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.timing.looptime == 0 {
            problems.push("timing.looptime must be at least 1 second".to_string());
        }
        if self.timing.urltimeout == 0 {
            problems.push("timing.urltimeout must be at least 1 second".to_string());
        }
        if reqwest::Url::parse(&self.twilio.url).is_err() {
            problems.push(format!("twilio.url is not a valid URL: {}", self.twilio.url));
        }

        let mut target_names = HashSet::new();
        for t in &self.targets {
            if !target_names.insert(t.name.as_str()) {
                problems.push(format!("duplicate target [{}]", t.name));
            }
            if reqwest::Url::parse(&t.url).is_err() {
                problems.push(format!("target [{}] has an invalid url: {}", t.name, t.url));
            }
        }

        let mut user_names = HashSet::new();
        for u in &self.users {
            if !user_names.insert(u.name.as_str()) {
                problems.push(format!("duplicate user [{}]", u.name));
            }
            for t in &u.targets {
                if !target_names.contains(t.as_str()) {
                    problems.push(format!(
                        "user [{}] has target [{}] configured but no corresponding target exists",
                        u.name, t
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Validate, then build the read-only registry the scheduler polls.
    pub fn to_registry(&self) -> Result<Registry, ConfigError> {
        self.validate()?;

        let users: Vec<(Arc<User>, &UserCfg)> = self
            .users
            .iter()
            .map(|u| (Arc::new(User::new(&u.name, &u.cell, u.cooldown)), u))
            .collect();

        let targets = self
            .targets
            .iter()
            .map(|t| {
                let subscribers = users
                    .iter()
                    .filter(|(_, cfg)| cfg.targets.iter().any(|name| *name == t.name))
                    .map(|(user, _)| Arc::clone(user))
                    .collect();
                Target::new(&t.name, &t.url, &t.button_text, subscribers)
            })
            .collect();

        Ok(Registry::new(
            targets,
            users.into_iter().map(|(user, _)| user).collect(),
        ))
    }

    pub fn twilio_credentials(&self) -> TwilioCredentials {
        TwilioCredentials {
            from: self.twilio.from.clone(),
            user: self.twilio.user.clone(),
            pass: self.twilio.pass.clone(),
            url: self.twilio.url.clone(),
        }
    }

    pub fn url_timeout(&self) -> Duration {
        Duration::from_secs(self.timing.urltimeout)
    }

    pub fn looptime(&self) -> Duration {
        Duration::from_secs(self.timing.looptime)
    }

    pub fn user_agent(&self) -> &str {
        self.timing.useragent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Seconds may be written as `3600` or `3600.0`, but never as a fraction.
fn whole_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(u64),
        Float(f64),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Whole(n) => Ok(n),
        Seconds::Float(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
        Seconds::Float(f) => Err(D::Error::custom(format!(
            "expected a whole, non-negative number of seconds, got {f}"
        ))),
    }
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}
