use std::fmt;
use std::net::Ipv6Addr;

use crate::domain::validation::ValidationError;

#[derive(Clone, PartialEq, Eq, Hash)]
/// SMS Traffic account login.
///
/// Invariant: non-empty after trimming. `Debug` output is redacted.
pub struct Login(String);

impl Login {
    /// Request field name used by SMS Traffic (`login`).
    pub const FIELD: &'static str = "login";

    /// Create a validated [`Login`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated login.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Login(***)")
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SMS Traffic account password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed). `Debug` output is
/// redacted.
pub struct Password(String);

impl Password {
    /// Request field name used by SMS Traffic (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender name shown to the recipient (`originator`).
///
/// Invariant: non-empty. The value must be registered with SMS Traffic and is passed
/// through exactly as given.
pub struct SenderName(String);

impl SenderName {
    /// Request field name used by SMS Traffic (`originator`).
    pub const FIELD: &'static str = "originator";

    /// Create a validated [`SenderName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the validated sender name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as sent to SMS Traffic (`phones`).
///
/// Invariant: non-empty after trimming. No normalization is performed; the value must
/// already be in the format the gateway expects.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Request field name used by SMS Traffic (`phones`).
    pub const FIELD: &'static str = "phones";

    /// Create a validated (non-empty) phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to SMS Traffic.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Masked form for logs: only the last four characters stay visible.
    pub fn masked(&self) -> String {
        let chars = self.0.chars().collect::<Vec<_>>();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }

        let split = chars.len() - 4;
        let tail = chars[split..].iter().collect::<String>();
        match chars[0] {
            '+' => format!("+{}{tail}", "*".repeat(split - 1)),
            _ => format!("{}{tail}", "*".repeat(split)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`message`).
///
/// Invariant: non-empty. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Request field name used by SMS Traffic (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Gateway host name or bracketed IPv6 literal (no scheme, port, or path).
///
/// Invariant: non-empty after trimming, lowercase, and free of whitespace and URL
/// delimiters; an IPv6 literal such as `[::1]` is the only form that may contain `:`.
pub struct Host(String);

impl Host {
    /// Configuration field name (`host`).
    pub const FIELD: &'static str = "host";

    /// Create a validated [`Host`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if let Some(literal) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return match literal.parse::<Ipv6Addr>() {
                Ok(_) => Ok(Self(trimmed.to_ascii_lowercase())),
                Err(_) => Err(ValidationError::InvalidHost {
                    input: trimmed.to_owned(),
                }),
            };
        }

        let invalid = trimmed
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | ':' | '@' | '?' | '#' | '[' | ']'));
        if invalid {
            return Err(ValidationError::InvalidHost {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Host from a built-in constant known to satisfy the invariants.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Borrow the validated host name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// SMS Traffic account credentials.
pub struct Credentials {
    pub login: Login,
    pub password: Password,
}

impl Credentials {
    /// Validate and pair a login with its password.
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            login: Login::new(login)?,
            password: Password::new(password)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// One gateway endpoint: a host with an optional port override.
pub struct Endpoint {
    host: Host,
    port: Option<u16>,
}

impl Endpoint {
    pub fn new(host: Host, port: Option<u16>) -> Self {
        Self { host, port }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// HTTPS URL for `path` on this endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("https://{self}{path}")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{port}", self.host),
            None => write!(f, "{}", self.host),
        }
    }
}
