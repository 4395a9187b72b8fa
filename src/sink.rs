use std::sync::mpsc;

use crate::{mailbox::Ticket, render::Artifact};

// Outcome
//------------------------------------------------------------------------------

/// Result of processing one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Artifact),
    Failure { message: String },
}

impl Outcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure { message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Success(artifact) => Some(artifact),
            Self::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { message } => Some(message),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failure { .. } => "failure",
        }
    }
}

// Sink
//------------------------------------------------------------------------------

/// Receives one [`Outcome`] per request the worker consumed.
///
/// Called on the worker thread. Implementations that need a particular thread
/// must hand the outcome off themselves, and must return promptly since the
/// worker takes no new request until `on_result` returns.
pub trait ResultSink: Send + 'static {
    fn on_result(&mut self, ticket: Ticket, outcome: Outcome);
}

impl<F> ResultSink for F
where
    F: FnMut(Ticket, Outcome) + Send + 'static,
{
    fn on_result(&mut self, ticket: Ticket, outcome: Outcome) {
        self(ticket, outcome)
    }
}

impl ResultSink for mpsc::Sender<(Ticket, Outcome)> {
    fn on_result(&mut self, ticket: Ticket, outcome: Outcome) {
        if self.send((ticket, outcome)).is_err() {
            tracing::debug!(%ticket, "Result receiver dropped, discarding outcome");
        }
    }
}
