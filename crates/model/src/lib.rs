//! The contract between the chat adapter and a hosted chat model.
//!
//! This crate describes what a vendor client must provide: a factory
//! that loads a model by name, a client that opens chat sessions, and
//! sessions that answer a message either at once or as a stream of
//! partial responses. The types here carry data in the vendor's shape
//! (authors `user`/`bot`, input/output example pairs), the translation
//! from generic chat messages lives in the adapter crate.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;
mod variant;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
pub use variant::*;
