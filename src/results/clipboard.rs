use std::sync::mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Destination for copy actions.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

type Request = (String, mpsc::Sender<Result<(), String>>);

/// Clipboard writes served by one dedicated thread.
///
/// The thread owns the platform clipboard for its whole life, so X11/Wayland
/// managers can still read the text after the copy call returns. Each write
/// is acknowledged only once the text is actually on the clipboard.
#[derive(Debug, Clone)]
pub struct ClipboardWriter {
    requests: mpsc::Sender<Request>,
}

impl ClipboardWriter {
    /// Start the thread. `open` runs on it and builds the setter.
    pub fn spawn<F, S>(open: F) -> Self
    where
        F: FnOnce() -> S + Send + 'static,
        S: FnMut(String) -> Result<(), String>,
    {
        let (requests, rx) = mpsc::channel::<Request>();
        std::thread::spawn(move || {
            let mut set = open();
            for (text, reply) in rx {
                let _ = reply.send(set(text));
            }
        });
        Self { requests }
    }
}

impl Clipboard for ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let stopped = || ClipboardError::Unavailable("clipboard writer stopped".to_string());
        let (reply, ack) = mpsc::channel();
        self.requests
            .send((text.to_string(), reply))
            .map_err(|_| stopped())?;
        ack.recv()
            .map_err(|_| stopped())?
            .map_err(ClipboardError::Unavailable)
    }
}

/// The desktop clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

static SYSTEM: OnceLock<ClipboardWriter> = OnceLock::new();

fn arboard_setter() -> impl FnMut(String) -> Result<(), String> {
    let mut clipboard: Option<arboard::Clipboard> = None;
    move |text| {
        if clipboard.is_none() {
            clipboard = Some(arboard::Clipboard::new().map_err(|e| e.to_string())?);
        }
        match clipboard.as_mut() {
            Some(c) => c.set_text(text).map_err(|e| e.to_string()),
            None => Err("no clipboard".to_string()),
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        SYSTEM
            .get_or_init(|| ClipboardWriter::spawn(arboard_setter))
            .clone()
            .write_text(text)
    }
}

/// Time to let clipboard managers take the text before process exit.
pub fn settle_delay() -> Duration {
    Duration::from_secs(2)
}
