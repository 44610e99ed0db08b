//! Async driver: feeds real connection events into a [`RunSession`] and
//! forwards its UI-facing effects to the owner over a channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use super::{Effect, Frame, Outcome, RunChannel, RunConnector, RunSession, SessionEvent};
use crate::model::{Config, ResultRow};

/// What the owner of a session sees, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunUpdate {
    Log(String),
    Results(Vec<ResultRow>),
    Finished(Outcome),
}

/// Owner's handle on a running session. Dropping it closes the connection.
pub struct RunHandle {
    id: Uuid,
    updates: mpsc::UnboundedReceiver<RunUpdate>,
    stop: Option<oneshot::Sender<()>>,
}

impl RunHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next update; `None` once the driver has exited.
    pub async fn next_update(&mut self) -> Option<RunUpdate> {
        self.updates.recv().await
    }

    /// Close the connection from the client side. Whether the remote engine
    /// abandons its work is up to the engine.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// Start a session: connect, send `snapshot` once on open, stream frames.
///
/// `open_timeout` is measured from session creation; if the connection is not
/// open by then the session closes with an error and nothing is sent.
pub fn spawn(
    connector: Arc<dyn RunConnector>,
    snapshot: &Config,
    open_timeout: Duration,
) -> RunHandle {
    let session = RunSession::new();
    let id = session.id();
    let payload = serde_json::to_string(snapshot);
    let (updates_tx, updates) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel();

    let span = tracing::info_span!("run_session", session_id = %id);
    tokio::spawn(
        async move {
            let mut driver = Driver {
                session,
                updates: updates_tx,
            };
            match payload {
                Ok(payload) => driver.run(connector, payload, open_timeout, stop_rx).await,
                Err(e) => {
                    driver.feed(SessionEvent::Failed(format!("cannot encode config: {}", e)));
                }
            }
        }
        .instrument(span),
    );

    RunHandle {
        id,
        updates,
        stop: Some(stop_tx),
    }
}

struct Driver {
    session: RunSession,
    updates: mpsc::UnboundedSender<RunUpdate>,
}

impl Driver {
    async fn run(
        &mut self,
        connector: Arc<dyn RunConnector>,
        payload: String,
        open_timeout: Duration,
        mut stop: oneshot::Receiver<()>,
    ) {
        info!("connecting run channel");
        let opened = tokio::select! {
            biased;
            // A stop while opening ends the session before anything is sent.
            _ = &mut stop => None,
            opened = tokio::time::timeout(open_timeout, connector.connect()) => Some(opened),
        };
        let mut channel = match opened {
            None => {
                info!("run stopped before the channel opened");
                self.feed(SessionEvent::Closed);
                return;
            }
            Some(Ok(Ok(channel))) => channel,
            Some(Ok(Err(e))) => {
                warn!(error = %e, "run channel failed to open");
                self.feed(SessionEvent::Failed(e.to_string()));
                return;
            }
            Some(Err(_)) => {
                warn!(timeout_ms = open_timeout.as_millis() as u64, "run channel open deadline elapsed");
                self.feed(SessionEvent::OpenDeadlineElapsed);
                return;
            }
        };

        if !matches!(stop.try_recv(), Err(oneshot::error::TryRecvError::Empty)) {
            info!("run stopped as the channel opened");
            channel.close().await;
            self.feed(SessionEvent::Closed);
            return;
        }

        if self.feed(SessionEvent::Opened) {
            self.send_config(channel.as_mut(), payload).await;
        }

        while !self.session.state().is_closed() {
            tokio::select! {
                frame = channel.next_text() => match frame {
                    Some(Ok(text)) => {
                        debug!(len = text.len(), "frame received");
                        self.feed(SessionEvent::Frame(Frame::decode(&text)));
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "run channel error");
                        self.feed(SessionEvent::Failed(e.to_string()));
                    }
                    None => {
                        self.feed(SessionEvent::Closed);
                    }
                },
                // Fires on an explicit stop and when the handle is dropped.
                _ = &mut stop => {
                    info!("closing run channel from client side");
                    channel.close().await;
                    self.feed(SessionEvent::Closed);
                }
            }
        }

        let elapsed = chrono::Utc::now() - self.session.started_at();
        info!(
            state = ?self.session.state(),
            elapsed_ms = elapsed.num_milliseconds(),
            log_lines = self.session.log().len(),
            "run session finished"
        );
    }

    async fn send_config(&mut self, channel: &mut dyn RunChannel, payload: String) {
        match channel.send_text(payload).await {
            Ok(()) => {
                debug!("config snapshot sent");
                self.feed(SessionEvent::Sent);
            }
            Err(e) => {
                warn!(error = %e, "failed to send config snapshot");
                self.feed(SessionEvent::Failed(e.to_string()));
            }
        }
    }

    /// Apply an event and forward UI effects. Returns whether the config
    /// must be sent now.
    fn feed(&mut self, event: SessionEvent) -> bool {
        let mut send = false;
        for effect in self.session.handle(event) {
            let update = match effect {
                Effect::SendConfig => {
                    send = true;
                    continue;
                }
                Effect::AppendLog(line) => RunUpdate::Log(line),
                Effect::ShowResults(rows) => RunUpdate::Results(rows),
                Effect::Finished(outcome) => RunUpdate::Finished(outcome),
            };
            // The owner may already be gone; the session still runs to its end.
            let _ = self.updates.send(update);
        }
        send
    }
}
