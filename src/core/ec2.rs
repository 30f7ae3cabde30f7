use crate::core::address::AddressRecord;
use crate::core::errors::{Operation, ProviderError, Result};
use crate::core::provider::AddressProvider;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::Address;
use aws_sdk_ec2::Client as Ec2Client;
use log::{debug, info, warn};
use std::env;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

/*-------------------------------------------------------------------------------------------------
  EC2 Provider Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [Ec2Provider] struct that allows you to customize how the AWS SDK is
/// configured.
///
/// ```no_run
/// let provider = eipcleanup::Ec2ProviderBuilder::new()
///     .profile("finops")
///     .retry_count(5)
///     .retry_initial_delay(500) // 500 ms
///     .operation_timeout(60_000) // 60 seconds
///     .build()?;
/// # Ok::<(), eipcleanup::Error>(())
/// ```
///
/// Retry settings tune the SDK's native standard retry mode; the provider never retries a call on
/// its own.
///
/// The [Ec2ProviderBuilder::new] method attempts to source configuration values from environment
/// variables when set and uses default values when the environment variables are not set. Use
/// [Ec2ProviderBuilder::default] to ignore the environment.
#[derive(Debug, Clone)]
pub struct Ec2ProviderBuilder {
    profile: Option<String>,
    endpoint_url: Option<String>,
    retry_count: u32,
    retry_initial_delay: u64,
    operation_timeout: u64,
}

/*--------------------------------------------------------------------------------------
  EC2 Provider Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for Ec2ProviderBuilder {
    /// Create a new [Ec2ProviderBuilder] with default configuration values.
    ///
    /// ```
    /// let builder = eipcleanup::Ec2ProviderBuilder::default();
    ///
    /// assert_eq!(builder.get_profile(), None);
    /// assert_eq!(builder.get_endpoint_url(), None);
    /// assert_eq!(builder.get_retry_count(), 3);
    /// assert_eq!(builder.get_retry_initial_delay(), 200);
    /// assert_eq!(builder.get_operation_timeout(), 30000);
    /// ```
    fn default() -> Self {
        Self {
            profile: None,
            endpoint_url: None,
            retry_count: 3,
            retry_initial_delay: 200,  // 200 ms
            operation_timeout: 30_000, // 30 seconds
        }
    }
}

impl Ec2ProviderBuilder {
    /// Create a new [Ec2ProviderBuilder] reading initial configuration values
    /// from environment variables when set and default values when the
    /// environment variables are not set.
    ///
    /// The environment variables used to set the initial configuration values
    /// are:
    /// - `EIPCLEANUP_PROFILE`
    /// - `EIPCLEANUP_ENDPOINT_URL`
    /// - `EIPCLEANUP_RETRY_COUNT`
    /// - `EIPCLEANUP_RETRY_INITIAL_DELAY`
    /// - `EIPCLEANUP_OPERATION_TIMEOUT`
    pub fn new() -> Self {
        let default = Ec2ProviderBuilder::default();

        Self {
            profile: get_optional_env_var("EIPCLEANUP_PROFILE"),
            endpoint_url: get_optional_env_var("EIPCLEANUP_ENDPOINT_URL"),
            retry_count: get_env_var("EIPCLEANUP_RETRY_COUNT", default.retry_count),
            retry_initial_delay: get_env_var(
                "EIPCLEANUP_RETRY_INITIAL_DELAY",
                default.retry_initial_delay,
            ),
            operation_timeout: get_env_var(
                "EIPCLEANUP_OPERATION_TIMEOUT",
                default.operation_timeout,
            ),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the named AWS profile used for credential and configuration
    /// resolution; defaults to the SDK's default provider chain.
    pub fn profile(&mut self, profile: &str) -> &mut Self {
        self.profile = Some(profile.to_string());
        self
    }

    /// Override the EC2 endpoint URL (e.g. a local API emulator).
    pub fn endpoint_url(&mut self, endpoint_url: &str) -> &mut Self {
        self.endpoint_url = Some(endpoint_url.to_string());
        self
    }

    /// Set the maximum number of attempts the SDK makes for each API call,
    /// including the first; defaults to `3`. Values below `1` are treated as
    /// `1`.
    pub fn retry_count(&mut self, retry_count: u32) -> &mut Self {
        self.retry_count = retry_count;
        self
    }

    /// Set the SDK's initial retry backoff (in milliseconds); defaults to
    /// `200` milliseconds.
    pub fn retry_initial_delay(&mut self, retry_initial_delay: u64) -> &mut Self {
        self.retry_initial_delay = retry_initial_delay;
        self
    }

    /// Set the maximum time (in milliseconds) for a single API operation,
    /// retries included; defaults to `30000` milliseconds (30 seconds).
    pub fn operation_timeout(&mut self, operation_timeout: u64) -> &mut Self {
        self.operation_timeout = operation_timeout;
        self
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn get_profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn get_endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn get_retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn get_retry_initial_delay(&self) -> u64 {
        self.retry_initial_delay
    }

    pub fn get_operation_timeout(&self) -> u64 {
        self.operation_timeout
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    /// Start the provider's runtime and resolve the shared SDK configuration
    /// (credentials are resolved lazily on the first API call).
    pub fn build(&self) -> Result<Ec2Provider> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("eipcleanup-sdk")
            .enable_all()
            .build()?;

        let retry_config = RetryConfig::standard()
            .with_max_attempts(self.retry_count.max(1))
            .with_initial_backoff(Duration::from_millis(self.retry_initial_delay));
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_millis(self.operation_timeout))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(retry_config)
            .timeout_config(timeout_config);
        if let Some(profile) = &self.profile {
            info!("Using AWS profile: {}", profile);
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            info!("Using EC2 endpoint URL: {}", endpoint_url);
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = runtime.block_on(loader.load());

        Ok(Ec2Provider {
            runtime,
            sdk_config,
        })
    }
}

/*-------------------------------------------------------------------------------------------------
  EC2 Provider
-------------------------------------------------------------------------------------------------*/

/// Blocking [AddressProvider] backed by the AWS SDK for EC2. Each call builds a region-scoped
/// client from the shared SDK configuration and blocks on the provider's runtime until the
/// request completes.
#[derive(Debug)]
pub struct Ec2Provider {
    runtime: Runtime,
    sdk_config: SdkConfig,
}

impl Ec2Provider {
    /// Build a provider from the environment; see [Ec2ProviderBuilder::new].
    pub fn new() -> Result<Self> {
        Ec2ProviderBuilder::new().build()
    }

    /// Handle to the provider's runtime, used to run background tasks such as signal handlers.
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    fn client(&self, region: &str) -> Ec2Client {
        let config = aws_sdk_ec2::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        Ec2Client::from_conf(config)
    }
}

impl AddressProvider for Ec2Provider {
    fn list_addresses(&self, region: &str) -> std::result::Result<Vec<AddressRecord>, ProviderError> {
        debug!("[{region}] DescribeAddresses");
        let client = self.client(region);
        let response = self
            .runtime
            .block_on(client.describe_addresses().send())
            .map_err(|error| provider_error(Operation::List, error))?;

        Ok(response
            .addresses()
            .iter()
            .filter_map(|address| address_record(region, address))
            .collect())
    }

    fn release_address(
        &self,
        region: &str,
        allocation_id: &str,
    ) -> std::result::Result<(), ProviderError> {
        debug!("[{region}] ReleaseAddress {allocation_id}");
        let client = self.client(region);
        self.runtime
            .block_on(client.release_address().allocation_id(allocation_id).send())
            .map(|_| ())
            .map_err(|error| provider_error(Operation::Release, error))
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Convert an EC2 address into an [AddressRecord]. The address is associated when it carries an
/// association, instance, or network interface ID. Addresses without an allocation ID cannot be
/// released by ID and are skipped.
fn address_record(region: &str, address: &Address) -> Option<AddressRecord> {
    let public_ip = address.public_ip().unwrap_or_default();

    let Some(allocation_id) = non_empty(address.allocation_id()) else {
        warn!("[{region}] Skipping address {public_ip} without an allocation ID");
        return None;
    };

    let association_ref = non_empty(address.association_id())
        .or_else(|| non_empty(address.instance_id()))
        .or_else(|| non_empty(address.network_interface_id()))
        .map(str::to_string);

    Some(AddressRecord::new(allocation_id, public_ip, association_ref))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Map an SDK error to a [ProviderError]. Service errors are classified by error code. A failure
/// to resolve credentials is an authorization error wherever the SDK surfaces it. Any other
/// dispatch or timeout failure means the regional endpoint was unreachable.
fn provider_error<E, R>(operation: Operation, error: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let message = DisplayErrorContext(&error).to_string();
    if is_credentials_error(&error) {
        return ProviderError::Auth(message);
    }
    match &error {
        SdkError::ServiceError(service_error) => {
            ProviderError::from_code(operation, service_error.err().code(), message)
        }
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ProviderError::Region(message),
        _ => ProviderError::from_code(operation, error.code(), message),
    }
}

/// Walk the error source chain looking for a credentials provider error.
fn is_credentials_error(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(error);
    while let Some(error) = source {
        if error.downcast_ref::<CredentialsError>().is_some() {
            return true;
        }
        source = error.source();
    }
    false
}

/// Get and parse an environment variable value or return a default value.
fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/// Get an environment variable value when set and non-empty.
fn get_optional_env_var(env_var: &str) -> Option<String> {
    env::var(env_var)
        .ok()
        .filter(|value| !value.is_empty())
        .inspect(|value| info!("Using {}: {}", env_var, value))
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
