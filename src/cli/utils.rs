/*-------------------------------------------------------------------------------------------------
  Utility Functions
-------------------------------------------------------------------------------------------------*/

/// Trim and lower-case region names, dropping empty entries and duplicates while preserving the
/// order in which the regions were given. Malformed names are kept; the scanner records them as
/// region failures without calling the provider.
pub fn normalize_regions(regions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(regions.len());
    for region in regions {
        let region = region.trim().to_lowercase();
        if !region.is_empty() && !normalized.contains(&region) {
            normalized.push(region);
        }
    }
    normalized
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
