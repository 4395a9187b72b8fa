use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    generator::Generator,
    mailbox::{Envelope, Mailbox},
    request::Request,
    sink::{Outcome, ResultSink},
};

/// Closes the mailbox when the worker exits, including when it unwinds, so
/// submitters stop feeding a dead pipeline.
struct CloseOnExit<'a>(&'a Mailbox<Request>);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::error!("Generation worker is unwinding, closing mailbox");
        }
        self.0.close();
    }
}

/// Worker loop: take the latest request, generate, deliver, repeat.
///
/// Exits when the mailbox is closed. A non validation error from the generator
/// is a broken contract and panics the worker.
///
/// # Arguments
///
/// - `mailbox`: Slot shared with submitters. `take` is the only place the loop
///   waits for work.
/// - `generator`: Encoder and rasterizer.
/// - `sink`: Receives exactly one outcome per consumed request.
/// - `throttle`: Optional minimum interval between the starts of two
///   consecutive generations.
pub(crate) fn worker_loop<G, S>(
    mailbox: Arc<Mailbox<Request>>,
    generator: G,
    mut sink: S,
    throttle: Option<Duration>,
) where
    G: Generator,
    S: ResultSink,
{
    let _guard = CloseOnExit(&mailbox);
    tracing::debug!("Generation worker started");

    while let Some(Envelope { ticket, item: request }) = mailbox.take() {
        let started = Instant::now();
        let span = tracing::debug_span!("generate", %ticket, text_len = request.text().len());
        let _enter = span.enter();

        let outcome = match generator.generate(&request) {
            Ok(artifact) => Outcome::Success(artifact),
            Err(err) if err.is_validation() => Outcome::failure(err.to_string()),
            Err(err) => {
                tracing::error!(error = %err, request = %request.metadata(), "Generator broke its contract");
                panic!("Generator failed on request {ticket}: {err}");
            }
        };

        tracing::debug!(outcome = outcome.kind(), elapsed = ?started.elapsed(), "Generated");
        sink.on_result(ticket, outcome);

        if let Some(interval) = throttle {
            let remaining = interval.saturating_sub(started.elapsed());
            if !remaining.is_zero() && mailbox.wait_closed(remaining) {
                break;
            }
        }
    }

    tracing::debug!("Generation worker stopped");
}

#[cfg(test)]
mod worker_tests {
    use std::{
        sync::{mpsc, Arc},
        thread,
        time::{Duration, Instant},
    };

    use super::worker_loop;
    use crate::{
        error::QRError, generator::QrGenerator, mailbox::Mailbox, render::Artifact,
        request::Request,
    };

    fn req(text: &str) -> Request {
        Request::builder(text).scale(1).build().unwrap()
    }

    #[test]
    fn test_loop_exits_on_close() {
        let mailbox = Arc::new(Mailbox::new());
        let (tx, rx) = mpsc::channel();
        let worker = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || worker_loop(mailbox, QrGenerator, tx, None))
        };

        let ticket = mailbox.submit(req("HELLO")).unwrap();
        let (t, outcome) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(t, ticket);
        assert!(outcome.is_success());

        mailbox.close();
        worker.join().unwrap();
    }

    #[test]
    fn test_internal_error_panics_and_closes() {
        let mailbox = Arc::new(Mailbox::new());
        let (tx, rx) = mpsc::channel();
        let generator =
            |_: &Request| -> Result<Artifact, QRError> { Err(QRError::Internal("corrupt".into())) };
        let worker = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || worker_loop(mailbox, generator, tx, None))
        };

        mailbox.submit(req("x")).unwrap();
        assert!(worker.join().is_err());
        assert!(mailbox.is_closed());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_throttle_spaces_generations() {
        let mailbox = Arc::new(Mailbox::new());
        let (tx, rx) = mpsc::channel();
        let worker = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                worker_loop(mailbox, QrGenerator, tx, Some(Duration::from_millis(150)))
            })
        };

        mailbox.submit(req("1")).unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let first = Instant::now();

        // Both land in the slot while the worker waits out the interval
        mailbox.submit(req("2")).unwrap();
        let last = mailbox.submit(req("3")).unwrap();
        let (t, _) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(t, last);
        assert!(first.elapsed() >= Duration::from_millis(100));

        let start = Instant::now();
        mailbox.close();
        worker.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
