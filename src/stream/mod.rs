//! SSE decoding and event dispatch.
//!
//! Bytes flow through three layers:
//!
//! 1. [`FrameDecoder`] turns arbitrary network chunks into complete lines,
//!    carrying split UTF-8 sequences and partial lines across chunks.
//! 2. [`parse_frame`] turns one line into a [`StreamEvent`](crate::types::StreamEvent).
//! 3. [`Dispatcher`] delivers events to a [`StreamHandler`] in arrival
//!    order and tracks the [`StreamState`] of the exchange.
//!
//! [`dispatch`] drives all three over an async byte stream, honoring a
//! cancellation token at every suspension point.

pub mod decoder;
pub mod dispatch;
pub mod handler;
pub mod state;

pub use decoder::{parse_frame, FrameDecoder};
pub use dispatch::{collect_response, decode_events, dispatch, Dispatcher};
pub use handler::{StreamCallbacks, StreamHandler};
pub use state::{StreamOutcome, StreamState};
