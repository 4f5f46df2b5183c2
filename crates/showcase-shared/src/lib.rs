//! # showcase-shared
//!
//! Domain types shared by the product showcase crates: the persisted
//! [`Product`](types::Product) record, its image representation, the
//! submission validation stage, and the inline image codec.
//!
//! Nothing in this crate performs I/O.

pub mod codec;
pub mod constants;
pub mod error;
pub mod types;
pub mod validation;

pub use error::{CodecError, ValidationError};
pub use types::*;
