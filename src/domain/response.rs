use crate::domain::message::SmsMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a successful send: the delivered message and the transport that took it.
pub struct SentMessage {
    pub message: SmsMessage,
    /// Descriptor of the transport, e.g. `smstraffic://api.smstraffic.ru?from=Shop`.
    pub transport: String,
}
