//! Public face of the generation core.
//!
//! A [`Pipeline`] owns the shared [`Mailbox`] and the one worker thread that
//! drains it. Callers [`submit`](Pipeline::submit) a [`Request`] on every input
//! change and receive outcomes through their [`ResultSink`]. Only the freshest
//! request is guaranteed to be generated, older ones still waiting in the slot
//! are dropped without an outcome.

use std::{
    any::Any,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    error::PipelineError,
    generator::Generator,
    mailbox::{Mailbox, Ticket},
    request::Request,
    sink::ResultSink,
    worker::worker_loop,
};

pub const DEFAULT_THREAD_NAME: &str = "qr-worker";

// Config
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Name of the worker thread.
    pub thread_name: String,
    /// Minimum interval between the starts of two generations. `None` lets the
    /// worker pick up the next request as soon as it is submitted.
    pub throttle: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { thread_name: DEFAULT_THREAD_NAME.to_string(), throttle: None }
    }
}

impl PipelineConfig {
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn throttle(mut self, interval: Duration) -> Self {
        self.throttle = Some(interval);
        self
    }
}

// Pipeline
//------------------------------------------------------------------------------

#[derive(Debug)]
pub struct Pipeline {
    mailbox: Arc<Mailbox<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl Pipeline {
    pub fn spawn<G, S>(generator: G, sink: S, config: PipelineConfig) -> Result<Self, PipelineError>
    where
        G: Generator,
        S: ResultSink,
    {
        let mailbox = Arc::new(Mailbox::new());
        let worker = {
            let mailbox = Arc::clone(&mailbox);
            let throttle = config.throttle;
            thread::Builder::new()
                .name(config.thread_name.clone())
                .spawn(move || worker_loop(mailbox, generator, sink, throttle))?
        };

        tracing::info!(thread = %config.thread_name, throttle = ?config.throttle, "Pipeline started");
        Ok(Self { mailbox, worker: Some(worker) })
    }

    /// Hands `request` to the worker, replacing any request it hasn't picked up
    /// yet. Never waits on generation.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Closed`] after shutdown or once the worker has died.
    pub fn submit(&self, request: Request) -> Result<Ticket, PipelineError> {
        let ticket = self.mailbox.submit(request).map_err(|_| PipelineError::Closed)?;
        tracing::trace!(%ticket, "Request submitted");
        Ok(ticket)
    }

    /// Number of requests overwritten before the worker could take them.
    pub fn superseded(&self) -> u64 {
        self.mailbox.superseded()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stops the worker and waits for it. A request being generated runs to
    /// completion and is delivered, a pending one is dropped.
    ///
    /// # Errors
    ///
    /// [`PipelineError::WorkerPanicked`] if the worker died on a programming
    /// error.
    pub fn shutdown(mut self) -> Result<(), PipelineError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), PipelineError> {
        self.mailbox.close();
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        worker.join().map_err(|payload| PipelineError::WorkerPanicked(panic_message(&*payload)))?;
        tracing::info!("Pipeline stopped");
        Ok(())
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::error!(error = %err, "Pipeline dropped after worker failure");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
