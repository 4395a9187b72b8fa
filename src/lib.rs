//! # qrlive
//!
//! Live QR code generation for interactive editors. Every keystroke or option
//! change becomes a [`Request`], requests are coalesced in a single slot
//! mailbox so only the freshest one is generated, and a dedicated worker thread
//! encodes and rasterizes it off the interactive thread.
//!
//! ## Features
//!
//! - **Latest wins**: submitting never blocks and never queues, a newer request
//!   replaces one the worker hasn't picked up yet
//! - **One worker**: requests are generated one at a time, outcomes arrive in
//!   the order requests were taken
//! - **Failures as values**: text that doesn't fit the chosen version, level or
//!   mode comes back as [`Outcome::Failure`] and the worker keeps going
//! - **Automatic options**: version, error correction level and mode can each
//!   be left to the encoder
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::mpsc;
//!
//! use qrlive::{ECLevel, Outcome, Pipeline, PipelineConfig, QrGenerator, Request};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (tx, rx) = mpsc::channel();
//! let pipeline = Pipeline::spawn(QrGenerator, tx, PipelineConfig::default())?;
//!
//! // Only the last of these is guaranteed to be generated
//! for text in ["H", "HE", "HEL", "HELL", "HELLO"] {
//!     pipeline.submit(Request::builder(text).ec_level(ECLevel::M).scale(4).build()?)?;
//! }
//!
//! loop {
//!     let (ticket, outcome) = rx.recv()?;
//!     if let Outcome::Success(artifact) = &outcome {
//!         println!("{ticket}: {}", artifact.symbol());
//!     }
//!     if ticket.get() == 5 {
//!         break;
//!     }
//! }
//! pipeline.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Options
//!
//! ### Versions
//! - 1 to 40, with sizes from 21x21 to 177x177 modules
//! - Automatic: the smallest version that holds the text
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction
//! - Automatic: M, raised as far as the version allows without growing
//!
//! ### Modes
//! - **Numeric**, **Alphanumeric**, **Byte** and **Kanji** (via Shift JIS)
//! - Automatic: the most compact of numeric, alphanumeric and byte that holds
//!   the whole text

pub mod encode;
pub mod error;
pub mod generator;
pub mod mailbox;
pub mod metadata;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod sink;
mod worker;

pub use encode::{encode, Symbol};
pub use error::{PipelineError, QRError, QRResult};
pub use generator::{Generator, QrGenerator};
pub use mailbox::{Envelope, Mailbox, MailboxClosed, Ticket};
pub use metadata::{ECLevel, Mode, Version};
pub use pipeline::{Pipeline, PipelineConfig};
pub use render::{rasterize, Artifact};
pub use request::{Request, RequestBuilder};
pub use sink::{Outcome, ResultSink};
