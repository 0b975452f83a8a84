use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

use crate::transport::{ProviderRequest, ProviderResponse};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure to obtain any response (DNS, connect, TLS, timeout, broken body stream).
pub type HttpError = Box<dyn StdError + Send + Sync>;

/// HTTP execution capability used by [`crate::SmsTrafficTransport`].
///
/// Implementations return `Err` only when no HTTP response was obtained. A response
/// with any status code, including 4xx/5xx, must be returned as `Ok`: the failover
/// policy depends on that distinction.
pub trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: ProviderRequest,
    ) -> BoxFuture<'a, Result<ProviderResponse, HttpError>>;
}

#[derive(Debug, Clone)]
pub(crate) struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub(crate) fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: ProviderRequest,
    ) -> BoxFuture<'a, Result<ProviderResponse, HttpError>> {
        Box::pin(async move {
            let mut builder = self.client.request(request.method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.body(request.body.to_wire()).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(ProviderResponse { status, body })
        })
    }
}
