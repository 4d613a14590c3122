//! The growable, append-only set of fully-valid source patches.
//!
//! Grounded on `region_extractor::extract_regions_by_index`'s
//! `visited: Vec<bool>` scan-and-collect idiom, generalised into an
//! append-only structure: additions are monotone because the mask only
//! ever transitions HOLE -> VALID, so entries are never invalidated and
//! rebuilds are unnecessary.

use std::collections::HashSet;

use crate::geometry::{Index, Region};
use crate::mask::Mask;

#[derive(Debug, Clone)]
pub struct SourcePatchIndex {
    radius: u32,
    regions: Vec<Region>,
    seen_centers: HashSet<Index>,
}

impl SourcePatchIndex {
    pub fn new(radius: u32) -> Self {
        Self { radius, regions: Vec::new(), seen_centers: HashSet::new() }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Scan every candidate centre within `search_region` (cropped to the
    /// image) and add it if its full `(2r+1)^2` extent is VALID and it
    /// hasn't already been indexed. Returns the number of regions added.
    pub fn scan(&mut self, mask: &Mask, search_region: Region) -> usize {
        let Some(cropped) = search_region.crop(mask.width(), mask.height()) else {
            return 0;
        };
        let mut added = 0;
        for center in cropped.indices() {
            if self.seen_centers.contains(&center) {
                continue;
            }
            let patch = Region::in_radius(center, self.radius);
            if mask.is_valid_region(patch) {
                self.seen_centers.insert(center);
                self.regions.push(patch);
                added += 1;
            }
        }
        added
    }

    /// Seed the index by scanning the entire image.
    pub fn seed(&mut self, mask: &Mask) -> usize {
        let whole = Region::new(Index::new(0, 0), mask.width(), mask.height());
        self.scan(mask, whole)
    }

    /// Every indexed region is fully VALID under `mask`. Exposed for
    /// tests and debug assertions.
    pub fn all_valid(&self, mask: &Mask) -> bool {
        self.regions.iter().all(|&r| mask.is_valid_region(r))
    }
}

#[cfg(test)]
mod tests {
    include!("source_index_tests.rs");
}
