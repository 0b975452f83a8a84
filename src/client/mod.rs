//! Client layer: the transport facade, failover, and transport ↔ domain error mapping.

mod events;
mod failover;
mod http;
mod variant;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use events::{NoopEvents, SendEvents};
pub use failover::Endpoints;
pub use http::{BoxFuture, HttpError, HttpTransport};
pub use variant::{LEGACY_FAILOVER_HOST, LEGACY_HOST, ProtocolVariant, SMART_DELIVERY_HOST};

use crate::domain::{
    Credentials, Endpoint, Host, Message, SenderName, SentMessage, SmsMessage, ValidationError,
};
use crate::transport::{ResponseError, SendParts, rejection_message};
use http::ReqwestTransport;

/// URL scheme used in transport descriptors and connection strings.
pub const SCHEME: &str = "smstraffic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Coarse classification of [`SmsTrafficError`].
pub enum ErrorKind {
    /// The message is not an SMS; a caller bug, never retried.
    UnsupportedMessageKind,
    /// No endpoint produced a response.
    DeliveryUnavailable,
    /// A response arrived with a status other than 200.
    GatewayHttpError,
    /// HTTP 200, but the gateway did not confirm acceptance.
    GatewayRejected,
    /// Invalid settings or a client that could not be constructed.
    Configuration,
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsTrafficTransport`].
pub enum SmsTrafficError {
    /// The dispatcher handed over a message this transport cannot deliver.
    #[error("the smstraffic transport only supports SMS messages (`{kind}` given)")]
    UnsupportedMessageKind { kind: String },

    /// Every endpoint failed at the transport level; `source` is the last failure.
    #[error("unable to send the SMS: {source}")]
    DeliveryUnavailable {
        endpoint: String,
        #[source]
        source: HttpError,
    },

    /// The gateway answered with a non-200 status.
    #[error("unable to send the SMS: gateway returned HTTP status={status}")]
    GatewayHttp { status: u16, body: Option<String> },

    /// The gateway answered 200 without a success marker.
    #[error("{}", rejection_message(.code, .description))]
    GatewayRejected {
        code: Option<String>,
        description: Option<String>,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The default HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] HttpError),
}

impl SmsTrafficError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedMessageKind { .. } => ErrorKind::UnsupportedMessageKind,
            Self::DeliveryUnavailable { .. } => ErrorKind::DeliveryUnavailable,
            Self::GatewayHttp { .. } => ErrorKind::GatewayHttpError,
            Self::GatewayRejected { .. } => ErrorKind::GatewayRejected,
            Self::Encode(_) | Self::Validation(_) | Self::Build(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the caller may retry the same message later.
    ///
    /// Only transport-level unavailability qualifies; a response from the gateway is final.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::DeliveryUnavailable
    }
}

impl From<ResponseError> for SmsTrafficError {
    fn from(value: ResponseError) -> Self {
        match value {
            ResponseError::HttpStatus { status, body } => Self::GatewayHttp { status, body },
            ResponseError::Rejected { code, description } => {
                Self::GatewayRejected { code, description }
            }
        }
    }
}

#[derive(Clone)]
/// Builder for [`SmsTrafficTransport`].
///
/// Use this when you need a non-default protocol, host, port, timeout, HTTP client, or
/// event hooks.
pub struct SmsTrafficTransportBuilder {
    credentials: Credentials,
    from: SenderName,
    variant: ProtocolVariant,
    host: Option<Host>,
    port: Option<u16>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    http: Option<Arc<dyn HttpTransport>>,
    events: Arc<dyn SendEvents>,
}

impl SmsTrafficTransportBuilder {
    /// Create a builder for the legacy protocol on its default host.
    pub fn new(credentials: Credentials, from: SenderName) -> Self {
        Self {
            credentials,
            from,
            variant: ProtocolVariant::default(),
            host: None,
            port: None,
            timeout: None,
            user_agent: None,
            http: None,
            events: Arc::new(NoopEvents),
        }
    }

    pub fn variant(mut self, variant: ProtocolVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Override the primary host. `None` keeps the variant's built-in host.
    pub fn host(mut self, host: Option<Host>) -> Self {
        self.host = host;
        self
    }

    /// Override the primary endpoint's port. The failover host always uses the default port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Timeout applied to each attempt separately; a failover attempt gets a fresh budget.
    ///
    /// Ignored when a custom [`HttpTransport`] is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header. Ignored with a custom [`HttpTransport`].
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Execute requests through `http` instead of the built-in `reqwest` client.
    pub fn http(mut self, http: Arc<dyn HttpTransport>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn events(mut self, events: Arc<dyn SendEvents>) -> Self {
        self.events = events;
        self
    }

    /// Build a [`SmsTrafficTransport`].
    pub fn build(self) -> Result<SmsTrafficTransport, SmsTrafficError> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                let client = builder
                    .build()
                    .map_err(|err| SmsTrafficError::Build(Box::new(err)))?;
                Arc::new(ReqwestTransport::new(client)) as Arc<dyn HttpTransport>
            }
        };

        let host = self
            .host
            .unwrap_or_else(|| Host::from_static(self.variant.default_host()));
        let endpoints = self.variant.endpoints(Endpoint::new(host, self.port));

        Ok(SmsTrafficTransport {
            credentials: self.credentials,
            from: self.from,
            variant: self.variant,
            endpoints,
            http,
            events: self.events,
        })
    }
}

#[derive(Clone)]
/// SMS Traffic transport for a notification dispatcher.
///
/// The transport is immutable after construction and can be shared across tasks; each
/// [`send`](Self::send) builds its own requests. By default it speaks the legacy protocol:
/// - `https://api.smstraffic.ru/multi.php`, then
/// - `https://api2.smstraffic.ru/multi.php` if the first host cannot be reached.
pub struct SmsTrafficTransport {
    credentials: Credentials,
    from: SenderName,
    variant: ProtocolVariant,
    endpoints: Endpoints,
    http: Arc<dyn HttpTransport>,
    events: Arc<dyn SendEvents>,
}

impl SmsTrafficTransport {
    /// Create a legacy-protocol transport on the default hosts.
    ///
    /// For more customization, use [`SmsTrafficTransport::builder`].
    pub fn new(credentials: Credentials, from: SenderName) -> Self {
        let variant = ProtocolVariant::default();
        let primary = Endpoint::new(Host::from_static(variant.default_host()), None);
        Self {
            credentials,
            from,
            variant,
            endpoints: variant.endpoints(primary),
            http: Arc::new(ReqwestTransport::new(reqwest::Client::new())),
            events: Arc::new(NoopEvents),
        }
    }

    /// Start building a transport with custom settings.
    pub fn builder(credentials: Credentials, from: SenderName) -> SmsTrafficTransportBuilder {
        SmsTrafficTransportBuilder::new(credentials, from)
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Whether this transport can deliver `message` (i.e. it is an SMS).
    pub fn supports(&self, message: &dyn Message) -> bool {
        message.as_sms().is_some()
    }

    /// Stable identifier `smstraffic://host[:port]?from=sender`; never contains credentials.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Send one message through the gateway.
    ///
    /// Errors:
    /// - [`SmsTrafficError::UnsupportedMessageKind`] if `message` is not an SMS (no request
    ///   is made),
    /// - [`SmsTrafficError::DeliveryUnavailable`] if no endpoint could be reached,
    /// - [`SmsTrafficError::GatewayHttp`] for a non-200 response,
    /// - [`SmsTrafficError::GatewayRejected`] when the gateway does not confirm acceptance.
    pub async fn send(&self, message: &dyn Message) -> Result<SentMessage, SmsTrafficError> {
        let Some(sms) = message.as_sms() else {
            return Err(SmsTrafficError::UnsupportedMessageKind {
                kind: message.kind().to_owned(),
            });
        };

        let transport = self.describe();
        self.events.before_send(sms, &transport);

        match self.deliver(sms).await {
            Ok(()) => {
                tracing::info!(
                    %transport,
                    phone = %sms.phone().masked(),
                    variant = self.variant.name(),
                    "SMS accepted by gateway"
                );
                let sent = SentMessage {
                    message: sms.clone(),
                    transport,
                };
                self.events.sent(&sent);
                Ok(sent)
            }
            Err(err) => {
                tracing::warn!(
                    %transport,
                    phone = %sms.phone().masked(),
                    error = %err,
                    "SMS delivery failed"
                );
                self.events.failed(sms, &err);
                Err(err)
            }
        }
    }

    async fn deliver(&self, sms: &SmsMessage) -> Result<(), SmsTrafficError> {
        let parts = SendParts {
            credentials: &self.credentials,
            from: &self.from,
            sms,
        };
        let variant = self.variant;

        let response = failover::deliver(self.http.as_ref(), &self.endpoints, |endpoint| {
            variant.build_request(endpoint, parts)
        })
        .await?;

        variant.validate(&response)?;
        Ok(())
    }
}

impl fmt::Display for SmsTrafficTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SCHEME}://{}?from={}",
            self.endpoints.primary(),
            self.from
        )
    }
}

impl fmt::Debug for SmsTrafficTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsTrafficTransport")
            .field("from", &self.from)
            .field("variant", &self.variant)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::transport::{JsonValidation, ProviderRequest, ProviderResponse, RequestBody};

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug, Default)]
    struct FakeTransportState {
        requests: Vec<ProviderRequest>,
        outcomes: VecDeque<Result<(u16, String), String>>,
    }

    impl FakeTransport {
        fn scripted(outcomes: Vec<Result<(u16, &str), &str>>) -> Self {
            let outcomes = outcomes
                .into_iter()
                .map(|outcome| {
                    outcome
                        .map(|(status, body)| (status, body.to_owned()))
                        .map_err(str::to_owned)
                })
                .collect();
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    requests: Vec::new(),
                    outcomes,
                })),
            }
        }

        fn requests(&self) -> Vec<ProviderRequest> {
            self.state.lock().unwrap().requests.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn execute<'a>(
            &'a self,
            request: ProviderRequest,
        ) -> BoxFuture<'a, Result<ProviderResponse, HttpError>> {
            Box::pin(async move {
                let outcome = {
                    let mut state = self.state.lock().unwrap();
                    state.requests.push(request);
                    state
                        .outcomes
                        .pop_front()
                        .expect("no scripted outcome left")
                };
                match outcome {
                    Ok((status, body)) => Ok(ProviderResponse { status, body }),
                    Err(message) => Err(HttpError::from(message)),
                }
            })
        }
    }

    #[derive(Debug, Default)]
    struct RecordingEvents {
        log: Mutex<Vec<String>>,
    }

    impl SendEvents for RecordingEvents {
        fn before_send(&self, message: &SmsMessage, transport: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("before {} via {transport}", message.phone().raw()));
        }

        fn sent(&self, sent: &SentMessage) {
            self.log
                .lock()
                .unwrap()
                .push(format!("sent via {}", sent.transport));
        }

        fn failed(&self, _message: &SmsMessage, error: &SmsTrafficError) {
            self.log
                .lock()
                .unwrap()
                .push(format!("failed {:?}", error.kind()));
        }
    }

    #[derive(Debug)]
    struct EmailMessage;

    impl Message for EmailMessage {
        fn kind(&self) -> &str {
            "email"
        }
    }

    fn sms() -> SmsMessage {
        SmsMessage::parse("+71234567890", "hi").unwrap()
    }

    fn builder() -> SmsTrafficTransportBuilder {
        SmsTrafficTransport::builder(
            Credentials::new("u", "p").unwrap(),
            SenderName::new("SENDER").unwrap(),
        )
    }

    fn make_transport(variant: ProtocolVariant, http: FakeTransport) -> SmsTrafficTransport {
        builder().variant(variant).http(Arc::new(http)).build().unwrap()
    }

    fn smart(validation: JsonValidation) -> ProtocolVariant {
        ProtocolVariant::SmartDelivery { validation }
    }

    #[tokio::test]
    async fn unsupported_message_kind_fails_without_network_call() {
        let http = FakeTransport::scripted(vec![]);
        let transport = make_transport(ProtocolVariant::Legacy, http.clone());

        assert!(!transport.supports(&EmailMessage));
        assert!(transport.supports(&sms()));

        let err = transport.send(&EmailMessage).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMessageKind);
        assert!(err.to_string().contains("`email`"));
        assert!(!err.is_retryable());
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn legacy_fails_over_when_primary_is_unreachable() {
        let http = FakeTransport::scripted(vec![
            Err("connection refused"),
            Ok((200, "<reply><result>OK</result><code>0</code></reply>")),
        ]);
        let transport = make_transport(ProtocolVariant::Legacy, http.clone());

        let sent = transport.send(&sms()).await.unwrap();
        assert_eq!(sent.transport, "smstraffic://api.smstraffic.ru?from=SENDER");
        assert_eq!(sent.message, sms());

        let requests = http.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://api.smstraffic.ru/multi.php");
        assert_eq!(requests[1].url, "https://api2.smstraffic.ru/multi.php");
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(
            requests[1].body,
            RequestBody::Form(vec![
                ("login".to_owned(), "u".to_owned()),
                ("password".to_owned(), "p".to_owned()),
                ("originator".to_owned(), "SENDER".to_owned()),
                ("phones".to_owned(), "+71234567890".to_owned()),
                ("message".to_owned(), "hi".to_owned()),
            ])
        );
    }

    #[tokio::test]
    async fn legacy_rejection_is_not_retried_on_failover_host() {
        let http = FakeTransport::scripted(vec![Ok((
            200,
            "<result>ERROR</result><code>42</code>",
        ))]);
        let transport = make_transport(ProtocolVariant::Legacy, http.clone());

        let err = transport.send(&sms()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GatewayRejected);
        assert!(err.to_string().contains("42"));
        match &err {
            SmsTrafficError::GatewayRejected { code, .. } => {
                assert_eq!(code.as_deref(), Some("42"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn legacy_http_error_is_not_retried_on_failover_host() {
        let http = FakeTransport::scripted(vec![Ok((503, "maintenance"))]);
        let transport = make_transport(ProtocolVariant::Legacy, http.clone());

        let err = transport.send(&sms()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsTrafficError::GatewayHttp {
                status: 503,
                body: Some(_)
            }
        ));
        assert!(err.to_string().contains("status=503"));
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn legacy_both_hosts_unreachable_reports_last_failure() {
        let http = FakeTransport::scripted(vec![
            Err("primary timed out"),
            Err("failover refused connection"),
        ]);
        let transport = make_transport(ProtocolVariant::Legacy, http.clone());

        let err = transport.send(&sms()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeliveryUnavailable);
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "unable to send the SMS: failover refused connection"
        );
        match err {
            SmsTrafficError::DeliveryUnavailable { endpoint, .. } => {
                assert_eq!(endpoint, "api2.smstraffic.ru");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(http.requests().len(), 2);
    }

    #[tokio::test]
    async fn smart_delivery_sends_exact_json_body() {
        let http = FakeTransport::scripted(vec![Ok((200, "{}"))]);
        let transport = make_transport(smart(JsonValidation::Lenient), http.clone());

        let sent = transport.send(&sms()).await.unwrap();
        assert_eq!(sent.transport, "smstraffic://sds.smstraffic.ru?from=SENDER");

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://sds.smstraffic.ru/smartdelivery-in/multi.php"
        );
        assert_eq!(
            requests[0].body,
            RequestBody::Json(
                r#"{"login":"u","password":"p","phones":"+71234567890","message":"hi","rus":0,"originator":"SENDER"}"#
                    .to_owned()
            )
        );
    }

    #[tokio::test]
    async fn smart_delivery_maps_non_200_to_http_error() {
        let http = FakeTransport::scripted(vec![Ok((400, ""))]);
        let transport = make_transport(smart(JsonValidation::Lenient), http);

        let err = transport.send(&sms()).await.unwrap_err();
        assert!(matches!(
            err,
            SmsTrafficError::GatewayHttp {
                status: 400,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn smart_delivery_never_fails_over() {
        let http = FakeTransport::scripted(vec![Err("dns failure")]);
        let transport = make_transport(smart(JsonValidation::Lenient), http.clone());

        let err = transport.send(&sms()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeliveryUnavailable);
        assert_eq!(http.requests().len(), 1);
    }

    #[tokio::test]
    async fn smart_delivery_strict_mode_checks_result_field() {
        let http = FakeTransport::scripted(vec![Ok((
            200,
            r#"{"result":"ERROR","code":"11","description":"no money"}"#,
        ))]);
        let transport = make_transport(smart(JsonValidation::Strict), http);

        let err = transport.send(&sms()).await.unwrap_err();
        match err {
            SmsTrafficError::GatewayRejected { code, description } => {
                assert_eq!(code.as_deref(), Some("11"));
                assert_eq!(description.as_deref(), Some("no money"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn events_fire_around_send() {
        let events = Arc::new(RecordingEvents::default());
        let http = FakeTransport::scripted(vec![
            Ok((200, "<result>OK</result>")),
            Ok((200, "<result>ERROR</result>")),
        ]);
        let transport = builder()
            .http(Arc::new(http))
            .events(events.clone())
            .build()
            .unwrap();

        transport.send(&sms()).await.unwrap();
        transport.send(&sms()).await.unwrap_err();
        transport.send(&EmailMessage).await.unwrap_err();

        let log = events.log.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                "before +71234567890 via smstraffic://api.smstraffic.ru?from=SENDER",
                "sent via smstraffic://api.smstraffic.ru?from=SENDER",
                "before +71234567890 via smstraffic://api.smstraffic.ru?from=SENDER",
                "failed GatewayRejected",
            ]
        );
    }

    #[tokio::test]
    async fn concurrent_sends_share_one_transport() {
        let http = FakeTransport::scripted(vec![
            Ok((200, "<result>OK</result>")),
            Ok((200, "<result>OK</result>")),
        ]);
        let transport = Arc::new(make_transport(ProtocolVariant::Legacy, http.clone()));

        let first = tokio::spawn({
            let transport = transport.clone();
            async move { transport.send(&sms()).await.map(|sent| sent.transport) }
        });
        let second = tokio::spawn({
            let transport = transport.clone();
            async move { transport.send(&sms()).await.map(|sent| sent.transport) }
        });

        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());
        assert_eq!(http.requests().len(), 2);
    }

    #[test]
    fn describe_never_leaks_credentials() {
        let transport = SmsTrafficTransport::builder(
            Credentials::new("secret-login", "secret-password").unwrap(),
            SenderName::new("Shop").unwrap(),
        )
        .host(Some(Host::new("gw.example.com").unwrap()))
        .port(Some(8443))
        .build()
        .unwrap();

        let described = transport.describe();
        assert_eq!(described, "smstraffic://gw.example.com:8443?from=Shop");
        assert!(!described.contains("secret-login"));
        assert!(!described.contains("secret-password"));

        let debugged = format!("{transport:?}");
        assert!(!debugged.contains("secret-login"));
        assert!(!debugged.contains("secret-password"));
    }

    #[test]
    fn host_override_keeps_legacy_failover() {
        let transport = builder()
            .host(Some(Host::new("gw.example.com").unwrap()))
            .build()
            .unwrap();
        let hosts = transport
            .endpoints()
            .iter()
            .map(|endpoint| endpoint.to_string())
            .collect::<Vec<_>>();
        assert_eq!(hosts, vec!["gw.example.com", "api2.smstraffic.ru"]);
    }

    #[test]
    fn new_uses_legacy_defaults() {
        let transport = SmsTrafficTransport::new(
            Credentials::new("u", "p").unwrap(),
            SenderName::new("SENDER").unwrap(),
        );
        assert_eq!(transport.variant(), ProtocolVariant::Legacy);
        assert_eq!(transport.endpoints().len(), 2);
        assert_eq!(
            transport.to_string(),
            "smstraffic://api.smstraffic.ru?from=SENDER"
        );
    }
}
