//! Legacy SMS Traffic API: form-encoded request, tagged-text response.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Endpoint, Login, MessageText, Password, PhoneNumber, SenderName};
use crate::transport::request::{ProviderRequest, RequestBody, SendParts};
use crate::transport::response::{ProviderResponse, ResponseError, ensure_http_ok};

pub const PATH: &str = "/multi.php";

const SUCCESS_MARKER: &str = "<result>OK</result>";

// The body is not guaranteed to be well-formed XML, so it is scanned rather than parsed.
// Codes are ASCII digits only.
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code>([0-9]+)</code>").expect("code pattern is valid"));

pub fn encode_send_form(parts: SendParts<'_>) -> Vec<(String, String)> {
    vec![
        (
            Login::FIELD.to_owned(),
            parts.credentials.login.as_str().to_owned(),
        ),
        (
            Password::FIELD.to_owned(),
            parts.credentials.password.as_str().to_owned(),
        ),
        (SenderName::FIELD.to_owned(), parts.from.as_str().to_owned()),
        (
            PhoneNumber::FIELD.to_owned(),
            parts.sms.phone().raw().to_owned(),
        ),
        (
            MessageText::FIELD.to_owned(),
            parts.sms.text().as_str().to_owned(),
        ),
    ]
}

pub fn build_request(endpoint: &Endpoint, parts: SendParts<'_>) -> ProviderRequest {
    ProviderRequest::post(
        endpoint.url(PATH),
        RequestBody::Form(encode_send_form(parts)),
    )
}

pub fn validate_response(response: &ProviderResponse) -> Result<(), ResponseError> {
    ensure_http_ok(response)?;

    if response.body.contains(SUCCESS_MARKER) {
        return Ok(());
    }

    let code = CODE_PATTERN
        .captures(&response.body)
        .and_then(|captures| captures.get(1))
        .map(|code| code.as_str().to_owned());

    Err(ResponseError::Rejected {
        code,
        description: None,
    })
}
