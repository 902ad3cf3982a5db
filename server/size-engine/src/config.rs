//! Engine configuration with sane defaults.

/// Tunables for history queries and report links.
#[derive(Debug, Clone)]
pub struct Config {
  /// Max records fetched for (and returned by) a history query.
  pub history_max_records: usize,
  /// Public base URL of the web app, used to build `linkToReport`. No link when unset.
  pub app_domain: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      history_max_records: 100,
      app_domain: None,
    }
  }
}
