use crate::client::SmsTrafficError;
use crate::domain::{SentMessage, SmsMessage};

/// Lifecycle hooks around [`crate::SmsTrafficTransport::send`].
///
/// Hooks run inline on the sending task and must not block. Messages of an unsupported
/// kind are rejected before any hook fires.
pub trait SendEvents: Send + Sync {
    fn before_send(&self, _message: &SmsMessage, _transport: &str) {}

    fn sent(&self, _sent: &SentMessage) {}

    fn failed(&self, _message: &SmsMessage, _error: &SmsTrafficError) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl SendEvents for NoopEvents {}
