//! # xhc-pendant
//!
//! Pendant protocol engine for the XHC WHB04B wireless CNC pendant.
//!
//! The engine turns raw input reports into machine-control signals and
//! turns machine state back into display updates. It does not open devices
//! itself: a [`PendantTransport`](session::PendantTransport) delivers raw
//! transfers and a [`SignalBus`](bus::SignalBus) carries the signals to and
//! from the motion controller.
//!
//! ## Architecture
//!
//! - [`buttons`] - Fn-modifier resolution of the two key slots
//! - [`mode`] - axis dial, jog mode and feed dial resolution
//! - [`jog`] - jog wheel accumulation, velocity and direction
//! - [`sleep`] - power-down handshake detection
//! - [`context`] - per-session state, edge events and display content
//! - [`bus`] - named signals and the bus abstraction
//! - [`session`] - the poll cycle and its cancellation
//! - [`simulate`] - stand-in machine for running without a controller
//! - [`config`] - session configuration
//! - [`mock`] - scripted transport
//!
//! ## Example
//!
//! ```rust
//! use std::time::Instant;
//! use xhc_pendant::prelude::*;
//!
//! let transport = MockTransport::new();
//! transport.queue_frame([0x04, 0x0c, 0x0f, 0x00, 0x0d, 0x11, 0x03, 0x00]);
//!
//! let mut session =
//!     PendantSession::new(PendantConfig::default(), transport.clone(), MemoryBus::new())?;
//! let report = session.poll_cycle(Instant::now())?;
//!
//! assert_eq!(report.outcome, FrameOutcome::Applied);
//! assert_eq!(session.context().current().step_size, StepSize::Step(0.001));
//! assert_eq!(session.bus().s32(Pin::JogCounts), 3);
//! assert_eq!(transport.sent_blocks().len(), 3);
//! # Ok::<(), PendantError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bus;
pub mod buttons;
pub mod config;
pub mod context;
pub mod error;
pub mod jog;
pub mod mock;
pub mod mode;
pub mod session;
pub mod simulate;
pub mod sleep;

pub mod prelude;

pub use error::{PendantError, PendantResult};
