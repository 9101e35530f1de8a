//! Small runtime helpers.

pub mod timeout;

pub use timeout::cancel_after;
