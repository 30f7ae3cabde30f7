use serde::Serialize;
use thiserror::Error as ThisError;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

// Error type alias used for setup and I/O failures throughout the crate.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*-------------------------------------------------------------------------------------------------
  Provider Errors
-------------------------------------------------------------------------------------------------*/

/// Provider API call that produced an error. Release calls downgrade most service errors to a
/// per-address [ProviderError::Rejected] result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    List,
    Release,
}

/// Errors returned by an [AddressProvider](crate::AddressProvider) implementation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ProviderError {
    /// Credential or permission failure; fatal for the whole run.
    #[error("authorization failure: {0}")]
    Auth(String),

    /// Invalid, disabled, or unreachable region; fatal for that region only.
    #[error("region unavailable: {0}")]
    Region(String),

    /// Rate limited after the SDK's own retry attempts were exhausted.
    #[error("request throttled: {0}")]
    Throttle(String),

    /// Release call rejected by the provider (e.g. the address was associated after it was
    /// listed).
    #[error("release rejected: {0}")]
    Rejected(String),

    #[error("provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Classify a provider service error by its error code.
    pub fn from_code(operation: Operation, code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            Some(
                "AuthFailure"
                | "UnauthorizedOperation"
                | "InvalidClientTokenId"
                | "SignatureDoesNotMatch"
                | "ExpiredToken"
                | "RequestExpired"
                | "Blocked",
            ) => ProviderError::Auth(message),
            Some("RequestLimitExceeded" | "Throttling" | "ThrottlingException") => {
                ProviderError::Throttle(message)
            }
            Some("OptInRequired" | "InvalidRegion") => ProviderError::Region(message),
            _ => match operation {
                Operation::List => ProviderError::Other(message),
                Operation::Release => ProviderError::Rejected(message),
            },
        }
    }

    /// Fatal errors stop the whole run rather than a single region.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Auth(_))
    }
}

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error(error: &Error) {
    log::error!("{}", error);
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_auth_codes_are_fatal() {
        for code in ["AuthFailure", "UnauthorizedOperation", "ExpiredToken"] {
            let error = ProviderError::from_code(Operation::List, Some(code), "denied");
            assert_eq!(error, ProviderError::Auth("denied".to_string()));
            assert!(error.is_fatal());
        }
    }

    #[test]
    fn test_throttle_codes() {
        let error = ProviderError::from_code(Operation::Release, Some("RequestLimitExceeded"), "");
        assert!(matches!(error, ProviderError::Throttle(_)));
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_region_codes() {
        let error = ProviderError::from_code(Operation::List, Some("OptInRequired"), "opt in");
        assert_eq!(error, ProviderError::Region("opt in".to_string()));
    }

    #[test]
    fn test_unknown_codes_depend_on_operation() {
        let list = ProviderError::from_code(Operation::List, Some("InternalError"), "boom");
        assert_eq!(list, ProviderError::Other("boom".to_string()));

        let release =
            ProviderError::from_code(Operation::Release, Some("InvalidIPAddress.InUse"), "in use");
        assert_eq!(release, ProviderError::Rejected("in use".to_string()));

        let no_code = ProviderError::from_code(Operation::Release, None, "unknown");
        assert_eq!(no_code, ProviderError::Rejected("unknown".to_string()));
    }

    #[test]
    fn test_serialize_provider_error() {
        let error = ProviderError::Throttle("slow down".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"kind":"throttle","message":"slow down"}"#);
    }

    #[test]
    fn test_log_error() {
        let error: Error = ProviderError::Other("logged".to_string()).into();
        log_error(&error);
    }
}
