//! Domain layer: strong types with validation and invariants (no I/O).

mod message;
mod response;
mod validation;
mod value;

pub use message::{Message, SmsMessage};
pub use response::SentMessage;
pub use validation::ValidationError;
pub use value::{
    Credentials, Endpoint, Host, Login, MessageText, Password, PhoneNumber, SenderName,
};
