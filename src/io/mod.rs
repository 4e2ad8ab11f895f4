//! Input/output helpers.
//!
//! - request JSON (single and batch) (`request`)
//! - result exports (`export`)

pub mod export;
pub mod request;

pub use export::*;
pub use request::*;
