use std::fmt;

use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, PhoneNumber};

/// A message handed to a transport by the notification dispatcher.
///
/// Dispatchers route many message kinds (chat, email, push); a transport inspects
/// [`Message::as_sms`] to decide whether it can deliver the value at all.
pub trait Message: fmt::Debug + Send + Sync {
    /// Short name of the message kind, used in diagnostics.
    fn kind(&self) -> &str;

    /// Borrow the message as an SMS, if it is one.
    fn as_sms(&self) -> Option<&SmsMessage> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A single SMS addressed to one phone number.
pub struct SmsMessage {
    phone: PhoneNumber,
    text: MessageText,
}

impl SmsMessage {
    /// Message kind reported by [`Message::kind`].
    pub const KIND: &'static str = "sms";

    /// Build an SMS from already validated parts.
    pub fn new(phone: PhoneNumber, text: MessageText) -> Self {
        Self { phone, text }
    }

    /// Validate raw inputs and build an SMS.
    pub fn parse(
        phone: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            phone: PhoneNumber::new(phone)?,
            text: MessageText::new(text)?,
        })
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }
}

impl Message for SmsMessage {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn as_sms(&self) -> Option<&SmsMessage> {
        Some(self)
    }
}
