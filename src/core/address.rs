use serde::Serialize;

/*-------------------------------------------------------------------------------------------------
  Address Record
-------------------------------------------------------------------------------------------------*/

/// An allocated static (Elastic) IP address as reported by the provider.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AddressRecord {
    /// Stable allocation identifier (e.g. `eipalloc-0abc...`).
    pub allocation_id: String,

    /// The public IP address in string form.
    pub public_ip: String,

    /// Association, instance, or network interface currently using the address.
    pub association_ref: Option<String>,
}

impl AddressRecord {
    pub fn new(
        allocation_id: impl Into<String>,
        public_ip: impl Into<String>,
        association_ref: Option<String>,
    ) -> Self {
        Self {
            allocation_id: allocation_id.into(),
            public_ip: public_ip.into(),
            association_ref,
        }
    }

    pub fn is_associated(&self) -> bool {
        self.association_ref.is_some()
    }
}

/*-------------------------------------------------------------------------------------------------
  Partition
-------------------------------------------------------------------------------------------------*/

/// Split address records into `(associated, unassociated)`. Every record lands in exactly one of
/// the two lists; input order is preserved within each.
pub fn partition(records: Vec<AddressRecord>) -> (Vec<AddressRecord>, Vec<AddressRecord>) {
    records.into_iter().partition(AddressRecord::is_associated)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
