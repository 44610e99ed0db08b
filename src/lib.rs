//! edgepick -- client controller for the edge IP speed-test engine.
//!
//! Loads the engine's configuration and location catalog, lets a front-end
//! edit and validate the configuration, saves it back, and drives test runs
//! over a persistent connection that streams log lines and a result table.

pub mod api;
pub mod form;
pub mod model;
pub mod results;
pub mod session;
pub mod settings;
pub mod term;

use std::sync::Arc;

use anyhow::Result;

use crate::api::HttpConfigApi;
use crate::form::{Backends, FormController, FormView};
use crate::session::WsConnector;
use crate::settings::ClientSettings;

/// Build a controller wired to the remote engine described by `settings`.
pub fn connect<V: FormView>(settings: &ClientSettings, view: V) -> Result<FormController<V>> {
    let base = settings.base_url()?;
    let api = HttpConfigApi::new(&base, settings.request_timeout())?;
    let run_url = settings.run_url()?;
    tracing::debug!(%base, %run_url, "remote engine endpoints");

    let backends = Backends {
        api: Arc::new(api),
        connector: Arc::new(WsConnector::new(run_url)),
        open_timeout: settings.open_timeout(),
    };
    Ok(FormController::new(backends, view))
}
