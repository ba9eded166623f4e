//! Synthesis configuration.
//!
//! Context values (`vsn`, `domain`, or anything else an application reads)
//! are resolved in order of precedence:
//! 1. `key=value` pairs passed on the command line
//! 2. Environment variables (`PURESTACK_VSN`, `PURESTACK_DOMAIN`)
//! 3. Built-in defaults
//!
//! The target account and region come from `CDK_DEFAULT_ACCOUNT` and
//! `CDK_DEFAULT_REGION` and stay unresolved when unset.
//!
//! `vsn` ends up in a stack name, a file name and a host name, so it is
//! limited to ASCII letters, digits, `-`, `_` and single dots.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_DOMAIN, DEFAULT_VSN, ENV_ACCOUNT, ENV_DOMAIN, ENV_REGION, ENV_VSN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  /// A context argument is not of the form `key=value`.
  #[error("invalid context argument '{0}': expected key=value")]
  InvalidContext(String),

  /// A context key was given without a value.
  #[error("context key '{0}' has an empty value")]
  EmptyValue(String),

  /// The version label cannot name a stack.
  #[error("invalid vsn '{0}': use letters, digits, '-', '_' or '.' without '..'")]
  InvalidVsn(String),
}

/// Account and region a stack deploys to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
  pub account: Option<String>,
  pub region: Option<String>,
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "aws://{}/{}",
      self.account.as_deref().unwrap_or("unknown-account"),
      self.region.as_deref().unwrap_or("unknown-region")
    )
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
  pub context: BTreeMap<String, String>,
  pub environment: Environment,
}

impl AppConfig {
  /// Configuration from environment variables only.
  pub fn from_env() -> Result<Self, ConfigError> {
    let mut context = BTreeMap::new();
    for (key, var) in [("vsn", ENV_VSN), ("domain", ENV_DOMAIN)] {
      if let Some(value) = non_empty_var(var) {
        debug!(key, var, "context from environment");
        validate_context(key, &value)?;
        context.insert(key.to_string(), value);
      }
    }

    Ok(Self {
      context,
      environment: Environment {
        account: non_empty_var(ENV_ACCOUNT),
        region: non_empty_var(ENV_REGION),
      },
    })
  }

  /// Override context with `key=value` arguments.
  pub fn with_context_args<S: AsRef<str>>(mut self, args: &[S]) -> Result<Self, ConfigError> {
    for arg in args {
      let (key, value) = parse_context_arg(arg.as_ref())?;
      validate_context(&key, &value)?;
      self.context.insert(key, value);
    }
    Ok(self)
  }

  pub fn try_get_context(&self, key: &str) -> Option<&str> {
    self.context.get(key).map(|value| value.as_str())
  }

  /// Version label of the deployment, `latest` by default.
  pub fn vsn(&self) -> &str {
    self.try_get_context("vsn").unwrap_or(DEFAULT_VSN)
  }

  /// Apex domain the API is served under, `example.com` by default.
  pub fn domain(&self) -> &str {
    self.try_get_context("domain").unwrap_or(DEFAULT_DOMAIN)
  }
}

fn parse_context_arg(arg: &str) -> Result<(String, String), ConfigError> {
  let (key, value) = arg
    .split_once('=')
    .ok_or_else(|| ConfigError::InvalidContext(arg.to_string()))?;

  let key = key.trim();
  if key.is_empty() {
    return Err(ConfigError::InvalidContext(arg.to_string()));
  }
  if value.is_empty() {
    return Err(ConfigError::EmptyValue(key.to_string()));
  }
  Ok((key.to_string(), value.to_string()))
}

fn validate_context(key: &str, value: &str) -> Result<(), ConfigError> {
  if key != "vsn" {
    return Ok(());
  }
  let allowed = value
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
  if !allowed || value.contains("..") {
    return Err(ConfigError::InvalidVsn(value.to_string()));
  }
  Ok(())
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|value| !value.is_empty())
}
