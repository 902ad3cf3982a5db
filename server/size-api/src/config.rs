//! Server configuration from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{0} must be set")]
  Missing(&'static str),

  #[error("{name} is invalid: {value}")]
  Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub database_url: String,
  pub bind: SocketAddr,
  pub app_domain: String,
  pub db_max_connections: u32,
  pub log_format: LogFormat,
}

impl ServerConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Build from any key lookup (the process environment in production).
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

    let port: u16 = parse_or("PORT", &lookup, 5005)?;
    let ip: IpAddr = parse_or("BIND_ADDR", &lookup, IpAddr::V4(Ipv4Addr::LOCALHOST))?;
    let db_max_connections: u32 = parse_or("DB_MAX_CONNECTIONS", &lookup, 10)?;

    let app_domain = lookup("APP_DOMAIN").unwrap_or_else(|| "http://localhost:3000".into());
    let log_format = match lookup("LOG_FORMAT").as_deref() {
      Some("json") => LogFormat::Json,
      _ => LogFormat::Text,
    };

    Ok(Self {
      database_url,
      bind: SocketAddr::new(ip, port),
      app_domain,
      db_max_connections,
      log_format,
    })
  }
}

fn parse_or<T: std::str::FromStr>(
  name: &'static str,
  lookup: &impl Fn(&str) -> Option<String>,
  default: T,
) -> Result<T, ConfigError> {
  match lookup(name) {
    Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_apply() {
    let config = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap();
    assert_eq!(config.bind, "127.0.0.1:5005".parse().unwrap());
    assert_eq!(config.app_domain, "http://localhost:3000");
    assert_eq!(config.log_format, LogFormat::Text);
    assert_eq!(config.db_max_connections, 10);
  }

  #[test]
  fn database_url_is_required() {
    let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
    assert_eq!(err.to_string(), "DATABASE_URL must be set");
  }

  #[test]
  fn invalid_port_is_reported() {
    let err = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "x"), ("PORT", "nope")])).unwrap_err();
    assert_eq!(err.to_string(), "PORT is invalid: nope");
  }

  #[test]
  fn overrides_apply() {
    let config = ServerConfig::from_lookup(lookup(&[
      ("DATABASE_URL", "x"),
      ("PORT", "8080"),
      ("BIND_ADDR", "0.0.0.0"),
      ("LOG_FORMAT", "json"),
    ]))
    .unwrap();
    assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
    assert_eq!(config.log_format, LogFormat::Json);
  }
}
