//! Transport layer: wire formats of the SMS Traffic HTTP API (no I/O).

pub mod legacy;
mod request;
mod response;
pub mod smart;

pub use request::{Encoding, ProviderRequest, RequestBody, SendParts};
pub(crate) use response::rejection_message;
pub use response::{ProviderResponse, ResponseError};
pub use smart::JsonValidation;
