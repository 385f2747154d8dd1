//! Result aggregation across tools.
//!
//! This module merges the per-tool entity sets of one scan into a single
//! sorted, deduplicated artifact.

use crate::models::{ExtractedEntities, ScanArtifact};
use std::collections::BTreeSet;

/// Merge entity sets into one artifact.
///
/// The result is the union of all inputs with both lists sorted
/// lexicographically, so input order and repetition do not matter.
pub fn merge<'a, I>(entities: I) -> ScanArtifact
where
    I: IntoIterator<Item = &'a ExtractedEntities>,
{
    let mut subdomains = BTreeSet::new();
    let mut emails = BTreeSet::new();

    for found in entities {
        subdomains.extend(found.subdomains.iter().cloned());
        emails.extend(found.emails.iter().cloned());
    }

    ScanArtifact {
        subdomains: subdomains.into_iter().collect(),
        emails: emails.into_iter().collect(),
    }
}
