use crate::client::SmsTrafficError;
use crate::client::http::HttpTransport;
use crate::domain::Endpoint;
use crate::transport::{ProviderRequest, ProviderResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Non-empty, ordered list of endpoints with distinct hosts.
pub struct Endpoints {
    primary: Endpoint,
    failover: Vec<Endpoint>,
}

impl Endpoints {
    pub fn new(primary: Endpoint) -> Self {
        Self {
            primary,
            failover: Vec::new(),
        }
    }

    /// Append a failover endpoint; endpoints whose host is already listed are ignored.
    pub fn with_failover(mut self, endpoint: Endpoint) -> Self {
        if !self.iter().any(|known| known.host() == endpoint.host()) {
            self.failover.push(endpoint);
        }
        self
    }

    pub fn primary(&self) -> &Endpoint {
        &self.primary
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        std::iter::once(&self.primary).chain(self.failover.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.failover.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Execute a request against each endpoint in order until one yields a response.
///
/// Only transport failures move on to the next endpoint. Any response, whatever its
/// status or body, is returned to the caller as-is. The request is rebuilt per endpoint.
pub(crate) async fn deliver<F>(
    http: &dyn HttpTransport,
    endpoints: &Endpoints,
    build: F,
) -> Result<ProviderResponse, SmsTrafficError>
where
    F: Fn(&Endpoint) -> Result<ProviderRequest, SmsTrafficError>,
{
    let mut remaining = endpoints.failover.iter();
    let mut endpoint = endpoints.primary();
    let mut attempt = 1;

    loop {
        let request = build(endpoint)?;
        tracing::debug!(%endpoint, attempt, url = %request.url, "sending request to SMS gateway");

        let source = match http.execute(request).await {
            Ok(response) => {
                tracing::debug!(%endpoint, status = response.status, "SMS gateway responded");
                return Ok(response);
            }
            Err(source) => source,
        };

        match remaining.next() {
            Some(next) => {
                tracing::warn!(
                    %endpoint,
                    failover = %next,
                    error = %source,
                    "SMS gateway unreachable, trying failover endpoint"
                );
                endpoint = next;
                attempt += 1;
            }
            None => {
                return Err(SmsTrafficError::DeliveryUnavailable {
                    endpoint: endpoint.to_string(),
                    source,
                });
            }
        }
    }
}
