//! Property tests for agent name normalization.

use std::collections::HashSet;

use sc2env_core::names::{crop_and_deduplicate_names, MAX_NAME_LENGTH};
use sc2env_test_utils::proptest::prelude::*;
use sc2env_test_utils::strategies::{arb_agent_name, arb_long_repeated_batch, arb_name_batch};

fn assert_well_formed(names: &[String], labels: &[String]) -> Result<(), TestCaseError> {
    prop_assert_eq!(labels.len(), names.len());
    let unique: HashSet<&String> = labels.iter().collect();
    prop_assert_eq!(unique.len(), labels.len(), "labels collide: {:?}", labels);
    for (raw, label) in names.iter().zip(labels) {
        prop_assert!(label.chars().count() <= MAX_NAME_LENGTH);
        // Either the cropped raw name or a prefixed form of it.
        let body = match label.strip_prefix('(') {
            Some(rest) if !raw.starts_with('(') => {
                rest.split_once(") ").map_or(label.as_str(), |(_, body)| body)
            }
            _ => label.as_str(),
        };
        prop_assert!(raw.starts_with(body));
    }
    Ok(())
}

proptest! {
    /// Output is position-aligned with the input, unique, and every label fits.
    #[test]
    fn prop_length_order_and_width(names in proptest::collection::vec(arb_agent_name(), 0..12)) {
        let labels = crop_and_deduplicate_names(&names);
        assert_well_formed(&names, &labels)?;
    }

    /// Long repeats that differ only near the crop point still get unique labels.
    #[test]
    fn prop_long_repeats_stay_unique(names in arb_long_repeated_batch(12)) {
        let labels = crop_and_deduplicate_names(&names);
        assert_well_formed(&names, &labels)?;
    }

    /// Batches full of repeats always de-duplicate.
    #[test]
    fn prop_repeated_names_become_unique(names in arb_name_batch(16)) {
        let labels = crop_and_deduplicate_names(&names);
        assert_well_formed(&names, &labels)?;
    }

    /// Names that are already unique and short pass through unchanged.
    #[test]
    fn prop_unique_short_names_unchanged(names in proptest::collection::hash_set("[a-z]{1,32}", 0..8)) {
        let names: Vec<String> = names.into_iter().collect();
        prop_assert_eq!(crop_and_deduplicate_names(&names), names);
    }

    /// Normalization is deterministic.
    #[test]
    fn prop_deterministic(names in arb_long_repeated_batch(10)) {
        prop_assert_eq!(
            crop_and_deduplicate_names(&names),
            crop_and_deduplicate_names(&names)
        );
    }
}
