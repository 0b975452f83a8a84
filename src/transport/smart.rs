//! Smart-delivery SMS Traffic API: JSON request, JSON response.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::Endpoint;
use crate::transport::request::{ProviderRequest, RequestBody, SendParts};
use crate::transport::response::{ProviderResponse, ResponseError, ensure_http_ok};

pub const PATH: &str = "/smartdelivery-in/multi.php";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How much of a smart-delivery response body is trusted.
pub enum JsonValidation {
    /// Any HTTP 200 response counts as delivered; the body is not inspected.
    #[default]
    Lenient,
    /// The body must be a JSON object whose `result` field is `OK`.
    Strict,
}

// Field order is part of the wire contract.
#[derive(Debug, Serialize)]
struct SmartDeliveryJsonRequest<'a> {
    login: &'a str,
    password: &'a str,
    phones: &'a str,
    message: &'a str,
    rus: u8,
    originator: &'a str,
}

pub fn encode_send_json(parts: SendParts<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SmartDeliveryJsonRequest {
        login: parts.credentials.login.as_str(),
        password: parts.credentials.password.as_str(),
        phones: parts.sms.phone().raw(),
        message: parts.sms.text().as_str(),
        rus: 0,
        originator: parts.from.as_str(),
    })
}

pub fn build_request(
    endpoint: &Endpoint,
    parts: SendParts<'_>,
) -> Result<ProviderRequest, serde_json::Error> {
    Ok(ProviderRequest::post(
        endpoint.url(PATH),
        RequestBody::Json(encode_send_json(parts)?),
    ))
}

pub fn validate_response(
    response: &ProviderResponse,
    validation: JsonValidation,
) -> Result<(), ResponseError> {
    ensure_http_ok(response)?;

    match validation {
        JsonValidation::Lenient => Ok(()),
        JsonValidation::Strict => validate_strict(&response.body),
    }
}

fn validate_strict(body: &str) -> Result<(), ResponseError> {
    let parsed: Value = serde_json::from_str(body).map_err(|err| invalid_json(err.to_string()))?;
    let Value::Object(fields) = parsed else {
        return Err(invalid_json("expected an object"));
    };

    let accepted = fields
        .get("result")
        .and_then(Value::as_str)
        .is_some_and(|result| result.trim().eq_ignore_ascii_case("OK"));
    if accepted {
        return Ok(());
    }

    Err(ResponseError::Rejected {
        code: text_field(&fields, "code"),
        description: text_field(&fields, "description"),
    })
}

// Strings are taken as-is; other non-null values keep their JSON rendering.
fn text_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

fn invalid_json(reason: impl std::fmt::Display) -> ResponseError {
    ResponseError::Rejected {
        code: None,
        description: Some(format!("invalid JSON response: {reason}")),
    }
}
