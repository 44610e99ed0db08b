//! Run session: one persistent connection to the remote engine, one config
//! sent, a stream of log lines and at most one result set back.
//!
//! The protocol is a pure state machine ([`transition`]) so it can be driven
//! by synthetic events in tests; [`driver`] feeds it real connection events.

pub mod driver;
pub mod frame;
pub mod transport;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::ResultRow;

pub use driver::{RunHandle, RunUpdate};
pub use frame::Frame;
pub use transport::{ChannelError, RunChannel, RunConnector, WsConnector};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

/// Session lifecycle. There is no externally observable idle state: a session
/// starts in `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingFirstSend,
    Streaming,
    Closed(Outcome),
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

/// Connection events fed into the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The connection's open event.
    Opened,
    /// The open deadline passed before the connection opened.
    OpenDeadlineElapsed,
    /// The config snapshot went out.
    Sent,
    Frame(Frame),
    /// Orderly close, from either end.
    Closed,
    /// Connect, send or receive failure.
    Failed(String),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Serialize and send the config snapshot. Emitted exactly once.
    SendConfig,
    AppendLog(String),
    ShowResults(Vec<ResultRow>),
    /// The session reached a terminal state; the run control may be re-enabled.
    Finished(Outcome),
}

pub const DEADLINE_LOG: &str = "Run connection did not open in time; test not started.";
pub const CLOSED_LOG: &str = "Run connection closed.";
pub const CLOSED_BEFORE_START_LOG: &str = "Run connection closed before the test started.";

/// Pure transition function: `(state, event) -> (state, effects)`.
///
/// Events that make no sense in the current state leave it unchanged and
/// produce no effects. Nothing leaves `Closed`.
pub fn transition(state: SessionState, event: SessionEvent) -> (SessionState, Vec<Effect>) {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (S::Closed(_), _) => (state, vec![]),

        (S::Connecting, E::Opened) => (S::AwaitingFirstSend, vec![Effect::SendConfig]),
        (S::Connecting, E::OpenDeadlineElapsed) => close(Outcome::Error, DEADLINE_LOG.to_string()),

        (S::AwaitingFirstSend, E::Sent) => (S::Streaming, vec![]),

        (S::AwaitingFirstSend | S::Streaming, E::Frame(frame)) => {
            let effects = match frame {
                Frame::Log(line) => vec![Effect::AppendLog(line)],
                Frame::Result(rows) => vec![Effect::ShowResults(rows)],
                Frame::Unreadable { raw, .. } => {
                    vec![Effect::AppendLog(format!("Error: unreadable message: {}", raw))]
                }
            };
            (state, effects)
        }

        (S::Streaming, E::Closed) => close(Outcome::Success, CLOSED_LOG.to_string()),
        (S::Connecting | S::AwaitingFirstSend, E::Closed) => {
            close(Outcome::Error, CLOSED_BEFORE_START_LOG.to_string())
        }

        (_, E::Failed(reason)) => close(Outcome::Error, format!("Run connection error: {}", reason)),

        (state, _) => (state, vec![]),
    }
}

fn close(outcome: Outcome, line: String) -> (SessionState, Vec<Effect>) {
    (
        SessionState::Closed(outcome),
        vec![Effect::AppendLog(line), Effect::Finished(outcome)],
    )
}

/// A session's state plus what it has demultiplexed so far.
#[derive(Debug, Clone)]
pub struct RunSession {
    id: Uuid,
    state: SessionState,
    started_at: DateTime<Utc>,
    log: Vec<String>,
    results: Option<Vec<ResultRow>>,
}

impl RunSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Connecting,
            started_at: Utc::now(),
            log: Vec::new(),
            results: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn results(&self) -> Option<&[ResultRow]> {
        self.results.as_deref()
    }

    /// Apply one event, record log/result effects, and return all effects.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        let (next, effects) = transition(self.state, event);
        self.state = next;
        for effect in &effects {
            match effect {
                Effect::AppendLog(line) => self.log.push(line.clone()),
                Effect::ShowResults(rows) => self.results = Some(rows.clone()),
                Effect::SendConfig | Effect::Finished(_) => {}
            }
        }
        effects
    }
}

impl Default for RunSession {
    fn default() -> Self {
        Self::new()
    }
}
