//! Best-effort punishment notifications.
//!
//! Every bad move is announced locally through `tracing`. When a target
//! URL is configured for the mover and dry-run is off, a short `GET`
//! request is also sent. Failures are logged and dropped; they never
//! reach the caller.

use std::time::Duration;

use reqwest::{Url, blocking::Client};
use shakmaty::Color;
use tracing::{info, warn};

use crate::{
    error::PunisherError,
    types::{PunishEvent, side_name},
};

/// Receiver of punishment events.
pub trait Notifier {
    fn notify(&self, event: &PunishEvent);
}

#[derive(Debug, Clone)]
pub struct PunisherConfig {
    pub white_url: Option<String>,
    pub black_url: Option<String>,
    /// Announce locally but never send a request.
    pub dry_run: bool,
    pub timeout: Duration,
}

impl Default for PunisherConfig {
    fn default() -> Self {
        Self {
            white_url: None,
            black_url: None,
            dry_run: false,
            timeout: Duration::from_millis(300),
        }
    }
}

pub struct Punisher {
    config: PunisherConfig,
    client: Client,
}

impl Punisher {
    pub fn new(config: PunisherConfig) -> Result<Self, PunisherError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Endpoint for `mover`; blank URLs count as unset.
    pub fn url_for(&self, mover: Color) -> Option<&str> {
        let url = match mover {
            Color::White => self.config.white_url.as_deref(),
            Color::Black => self.config.black_url.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }

    /// `<base>?severity=..&loss=..&move=..`
    pub fn request_url(base: &str, event: &PunishEvent) -> Result<Url, PunisherError> {
        Url::parse_with_params(
            base,
            &[
                ("severity", event.severity.to_string()),
                ("loss", event.loss.to_string()),
                ("move", event.uci.to_string()),
            ],
        )
        .map_err(|e| PunisherError::InvalidUrl(format!("{base}: {e}")))
    }

    fn send(&self, base: &str, event: &PunishEvent) -> Result<(), PunisherError> {
        let url = Self::request_url(base, event)?;
        self.client.get(url).send()?.error_for_status()?;
        Ok(())
    }
}

impl Notifier for Punisher {
    fn notify(&self, event: &PunishEvent) {
        let url = self.url_for(event.mover);
        info!(
            mover = side_name(event.mover),
            severity = %event.severity,
            uci = %event.uci,
            loss = event.loss,
            bestmove = %event.best_move,
            url = url.unwrap_or(""),
            dry_run = self.config.dry_run,
            "punish"
        );

        let Some(url) = url else { return };
        if self.config.dry_run {
            return;
        }
        if let Err(e) = self.send(url, event) {
            warn!(error = %e, "punish request failed");
        }
    }
}
