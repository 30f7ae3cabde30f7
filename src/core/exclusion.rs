use crate::core::errors::{Error, Result};
use log::info;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/*-------------------------------------------------------------------------------------------------
  Exclusion Set
-------------------------------------------------------------------------------------------------*/

/// Allocation IDs exempt from release regardless of their association status.
///
/// The exclusion (whitelist) file is plain text with one allocation ID per line. Surrounding
/// whitespace is trimmed; blank lines and lines beginning with `#` are ignored. IDs that do not
/// match any allocated address are never reported.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExclusionSet {
    allocation_ids: BTreeSet<String>,
}

impl ExclusionSet {
    /// Load the exclusion set from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|error| -> Error {
            format!("Unable to read exclusion file {:?}: {}", path, error).into()
        })?;

        let exclusion_set = Self::parse(&contents);
        info!(
            "Loaded {} excluded allocation ID(s) from {:?}",
            exclusion_set.len(),
            path
        );

        Ok(exclusion_set)
    }

    /// Parse exclusion file contents.
    pub fn parse(contents: &str) -> Self {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    pub fn contains(&self, allocation_id: &str) -> bool {
        self.allocation_ids.contains(allocation_id)
    }

    pub fn len(&self) -> usize {
        self.allocation_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocation_ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            allocation_ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
