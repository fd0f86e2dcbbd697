#![deny(missing_docs)]
//! Declarative prompt signatures.
//!
//! A [`Signature`] names the input and output fields of one model call. Each
//! field carries a type ([`FieldKind`]) and a free-text description that is
//! sent to the model verbatim. An [`Adapter`] turns a signature plus input
//! values into chat messages and parses the completion back into a
//! [`Prediction`].
//!
//! The [`catalog`] module declares the signatures of every call-site in the
//! pipeline.

pub mod adapter;
pub mod catalog;
pub mod error;
pub mod field;
pub mod prediction;
pub mod signature;

pub use adapter::{Adapter, ChatAdapter, JsonAdapter};
pub use error::SignatureError;
pub use field::{FieldKind, FieldSpec};
pub use prediction::Prediction;
pub use signature::{Inputs, Signature};
