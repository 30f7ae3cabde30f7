use crate::core::address::AddressRecord;
use crate::core::errors::ProviderError;

/*-------------------------------------------------------------------------------------------------
  Address Provider
-------------------------------------------------------------------------------------------------*/

/// The cloud provider's address API as consumed by the [Scanner](crate::Scanner).
///
/// Implementations map their client's native errors to [ProviderError] so the scanner can branch
/// on explicit results.
pub trait AddressProvider {
    /// List all allocated addresses in `region`.
    fn list_addresses(&self, region: &str) -> Result<Vec<AddressRecord>, ProviderError>;

    /// Release the address identified by `allocation_id` in `region`.
    fn release_address(&self, region: &str, allocation_id: &str) -> Result<(), ProviderError>;
}

impl<P: AddressProvider + ?Sized> AddressProvider for &P {
    fn list_addresses(&self, region: &str) -> Result<Vec<AddressRecord>, ProviderError> {
        (**self).list_addresses(region)
    }

    fn release_address(&self, region: &str, allocation_id: &str) -> Result<(), ProviderError> {
        (**self).release_address(region, allocation_id)
    }
}
