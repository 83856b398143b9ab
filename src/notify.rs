//! UI collaborators - 通知与确认
//!
//! Fire-and-forget toast notifications and the confirmation gate used
//! before destructive operations. The real implementations live in the
//! embedding UI shell; this module holds the contracts plus a
//! log-backed default and a recording double.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

/// Toast notification collaborator
pub trait Notifier {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// Confirmation gate for destructive operations
pub trait Confirmer {
    fn confirm_destructive(&self, message: &str) -> bool;
}

/// Log-backed collaborator for embeddings without a toast layer.
///
/// Declines destructive confirmations unless constructed permissive, so
/// wiring it in by accident can never delete anything.
#[derive(Clone, Debug, Default)]
pub struct TracingUi {
    confirm_all: bool,
}

impl TracingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant that answers yes to every confirmation prompt
    pub fn permissive() -> Self {
        Self { confirm_all: true }
    }
}

impl Notifier for TracingUi {
    fn notify_success(&self, message: &str) {
        info!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        warn!("{}", message);
    }
}

impl Confirmer for TracingUi {
    fn confirm_destructive(&self, message: &str) -> bool {
        if !self.confirm_all {
            debug!("declined: {}", message);
        }
        self.confirm_all
    }
}

/// Message kind recorded by [`RecordingUi`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Recording double used by the test suite and widget previews
#[derive(Debug, Default)]
pub struct RecordingUi {
    confirm_answer: bool,
    messages: Mutex<Vec<(MessageKind, String)>>,
}

impl RecordingUi {
    /// Answers yes to every confirmation
    pub fn accepting() -> Self {
        Self {
            confirm_answer: true,
            ..Default::default()
        }
    }

    /// Answers no to every confirmation
    pub fn declining() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(MessageKind, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, kind: MessageKind, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, message.to_string()));
    }
}

impl Notifier for RecordingUi {
    fn notify_success(&self, message: &str) {
        self.record(MessageKind::Success, message);
    }

    fn notify_error(&self, message: &str) {
        self.record(MessageKind::Error, message);
    }
}

impl Confirmer for RecordingUi {
    fn confirm_destructive(&self, _message: &str) -> bool {
        self.confirm_answer
    }
}
