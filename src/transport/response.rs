#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw HTTP response as received from the gateway.
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error("unexpected HTTP status={status}")]
    HttpStatus { status: u16, body: Option<String> },

    #[error("{}", rejection_message(.code, .description))]
    Rejected {
        code: Option<String>,
        description: Option<String>,
    },
}

/// The gateway only reports success with HTTP 200; anything else fails before body parsing.
pub fn ensure_http_ok(response: &ProviderResponse) -> Result<(), ResponseError> {
    if response.status == 200 {
        return Ok(());
    }

    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body.clone())
    };
    Err(ResponseError::HttpStatus {
        status: response.status,
        body,
    })
}

pub(crate) fn rejection_message(code: &Option<String>, description: &Option<String>) -> String {
    let mut message = "Unable to send the SMS".to_owned();
    if let Some(code) = code {
        message.push_str(". Code ");
        message.push_str(code);
    }
    if let Some(description) = description {
        message.push_str(": ");
        message.push_str(description);
    }
    message
}
