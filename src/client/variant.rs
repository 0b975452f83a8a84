use crate::client::SmsTrafficError;
use crate::client::failover::Endpoints;
use crate::domain::{Endpoint, Host};
use crate::transport::{
    Encoding, JsonValidation, ProviderRequest, ProviderResponse, ResponseError, SendParts,
    legacy, smart,
};

/// Default primary host of the legacy API.
pub const LEGACY_HOST: &str = "api.smstraffic.ru";
/// Host tried when [`LEGACY_HOST`] cannot be reached.
pub const LEGACY_FAILOVER_HOST: &str = "api2.smstraffic.ru";
/// Default host of the smart-delivery API (no failover).
pub const SMART_DELIVERY_HOST: &str = "sds.smstraffic.ru";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Wire protocol spoken with the gateway.
pub enum ProtocolVariant {
    /// Form-encoded `/multi.php` with `<result>OK</result>` responses and host failover.
    #[default]
    Legacy,
    /// JSON `/smartdelivery-in/multi.php`, single host.
    SmartDelivery { validation: JsonValidation },
}

impl ProtocolVariant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::SmartDelivery { .. } => "smart",
        }
    }

    pub fn encoding(self) -> Encoding {
        match self {
            Self::Legacy => Encoding::Form,
            Self::SmartDelivery { .. } => Encoding::Json,
        }
    }

    pub fn default_host(self) -> &'static str {
        match self {
            Self::Legacy => LEGACY_HOST,
            Self::SmartDelivery { .. } => SMART_DELIVERY_HOST,
        }
    }

    pub fn failover_host(self) -> Option<&'static str> {
        match self {
            Self::Legacy => Some(LEGACY_FAILOVER_HOST),
            Self::SmartDelivery { .. } => None,
        }
    }

    /// Ordered endpoints to attempt, starting with `primary`.
    pub(crate) fn endpoints(self, primary: Endpoint) -> Endpoints {
        let endpoints = Endpoints::new(primary);
        match self.failover_host() {
            Some(host) => endpoints.with_failover(Endpoint::new(Host::from_static(host), None)),
            None => endpoints,
        }
    }

    pub fn build_request(
        self,
        endpoint: &Endpoint,
        parts: SendParts<'_>,
    ) -> Result<ProviderRequest, SmsTrafficError> {
        match self {
            Self::Legacy => Ok(legacy::build_request(endpoint, parts)),
            Self::SmartDelivery { .. } => Ok(smart::build_request(endpoint, parts)?),
        }
    }

    pub fn validate(self, response: &ProviderResponse) -> Result<(), ResponseError> {
        match self {
            Self::Legacy => legacy::validate_response(response),
            Self::SmartDelivery { validation } => smart::validate_response(response, validation),
        }
    }
}
