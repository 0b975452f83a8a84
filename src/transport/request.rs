use reqwest::Method;

use crate::domain::{Credentials, SenderName, SmsMessage};

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a [`ProviderRequest`] body is encoded on the wire.
pub enum Encoding {
    Form,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Encoded request body.
pub enum RequestBody {
    /// Ordered `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// A serialized JSON document.
    Json(String),
}

impl RequestBody {
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Form(_) => Encoding::Form,
            Self::Json(_) => Encoding::Json,
        }
    }

    /// Serialize the body to the bytes sent on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            Self::Form(params) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish(),
            Self::Json(json) => json.clone(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
/// A fully built outbound request for one endpoint.
///
/// The body carries credentials, so `Debug` only prints the method, URL and encoding.
pub struct ProviderRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ProviderRequest {
    pub(crate) fn post(url: String, body: RequestBody) -> Self {
        let content_type = match body.encoding() {
            Encoding::Form => CONTENT_TYPE_FORM,
            Encoding::Json => CONTENT_TYPE_JSON,
        };
        Self {
            method: Method::POST,
            url,
            headers: vec![("Content-Type".to_owned(), content_type.to_owned())],
            body,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.body.encoding()
    }
}

impl std::fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("encoding", &self.encoding())
            .finish_non_exhaustive()
    }
}

/// Borrowed inputs shared by every wire format.
#[derive(Debug, Clone, Copy)]
pub struct SendParts<'a> {
    pub credentials: &'a Credentials,
    pub from: &'a SenderName,
    pub sms: &'a SmsMessage,
}
