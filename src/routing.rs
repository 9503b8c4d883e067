//! Route registration and express-style dispatch.
//!
//! A [`Stack`] holds [`Layer`]s in registration order. Every inbound message
//! becomes a [`Request`] that is handed from one matching layer to the next
//! according to the [`Flow`] each handler returns.

pub mod error;
pub mod handler;
pub mod layer;
pub mod request;
pub mod stack;


pub use error::{BoxError, DispatchError, RouteConfigError};
pub use handler::{Flow, Handler, HandlerResult};
pub use layer::Layer;
pub use request::Request;
pub use stack::{DispatchOutcome, Stack};
