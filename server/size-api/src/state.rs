//! Shared application state.

use size_engine::Engine;

/// Handed to every handler. The engine owns the single long-lived store handle.
pub struct AppState {
  pub engine: Engine,
}
