//! Agent display names.
//!
//! The game crops player names to a hard character limit and gets confused
//! when two players in the same match share a name. Names are therefore
//! cropped first, and any names that are equal after cropping get a
//! 1-based occurrence prefix such as `"(2) "`, after which the whole label
//! is cropped again so it still fits.

use std::collections::{HashMap, HashSet};

/// Maximum display width of an agent name, in characters.
pub const MAX_NAME_LENGTH: usize = 32;

/// Crop `name` to at most `max` characters.
fn crop(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

/// `"(k) <name>"`, with the name shortened so the label fits.
fn prefixed(index: usize, name: &str) -> String {
    let prefix = format!("({index}) ");
    let room = MAX_NAME_LENGTH.saturating_sub(prefix.chars().count());
    format!("{prefix}{}", crop(name, room))
}

/// Crop and de-duplicate agent names.
///
/// Output position `i` always corresponds to input position `i`, and every
/// label is unique and at most [`MAX_NAME_LENGTH`] characters. Names that
/// are unique after cropping are returned cropped and unprefixed; every
/// occurrence of a repeated cropped name becomes `"(k) <name>"`, with the
/// name portion shortened so the label fits.
///
/// Shortening can make two prefixed labels equal again (names that differ
/// only in their last few characters), and a raw name may already look like
/// a generated label. Any later occurrence of such a label takes the
/// smallest index whose label is not used anywhere in the batch.
pub fn crop_and_deduplicate_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let cropped: Vec<&str> = names
        .iter()
        .map(|n| crop(n.as_ref(), MAX_NAME_LENGTH))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &name in &cropped {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut next_index: HashMap<&str, usize> = HashMap::new();
    let mut labels: Vec<String> = cropped
        .iter()
        .map(|&name| {
            if counts[name] == 1 {
                return name.to_string();
            }
            let index = next_index.entry(name).or_insert(1);
            let label = prefixed(*index, name);
            *index += 1;
            label
        })
        .collect();

    let mut taken: HashSet<String> = labels.iter().cloned().collect();
    if taken.len() == labels.len() {
        return labels;
    }

    let mut seen: HashSet<String> = HashSet::with_capacity(labels.len());
    for (label, &name) in labels.iter_mut().zip(&cropped) {
        if seen.insert(label.clone()) {
            continue;
        }
        // At most `names.len()` labels are taken, so this finds one.
        let relabel = (1..)
            .map(|index| prefixed(index, name))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_default();
        tracing::debug!(from = %label, to = %relabel, "Relabelled colliding agent name");
        taken.insert(relabel.clone());
        seen.insert(relabel.clone());
        *label = relabel;
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(names: &[&str]) -> Vec<String> {
        crop_and_deduplicate_names(names)
    }

    fn assert_unique(labels: &[String]) {
        let unique: HashSet<&String> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len(), "labels collide: {labels:?}");
    }

    #[test]
    fn test_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_single_no_crop() {
        assert_eq!(normalize(&["agent_1"]), vec!["agent_1"]);
    }

    #[test]
    fn test_single_cropped() {
        assert_eq!(
            normalize(&["very_long_agent_name_experimental_1"]),
            vec!["very_long_agent_name_experimenta"]
        );
    }

    #[test]
    fn test_no_dupes_no_crop() {
        assert_eq!(
            normalize(&["agent_1", "agent_2"]),
            vec!["agent_1", "agent_2"]
        );
    }

    #[test]
    fn test_no_dupes_cropped() {
        assert_eq!(
            normalize(&[
                "a_very_long_agent_name_experimental",
                "b_very_long_agent_name_experimental",
            ]),
            vec![
                "a_very_long_agent_name_experimen",
                "b_very_long_agent_name_experimen",
            ]
        );
    }

    #[test]
    fn test_dupes_no_crop() {
        assert_eq!(
            normalize(&["agent_1", "agent_1"]),
            vec!["(1) agent_1", "(2) agent_1"]
        );
    }

    #[test]
    fn test_dupes_cropped() {
        // Distinct raw names that only collide after cropping.
        assert_eq!(
            normalize(&[
                "very_long_agent_name_experimental_c123",
                "very_long_agent_name_experimental_c456",
            ]),
            vec![
                "(1) very_long_agent_name_experim",
                "(2) very_long_agent_name_experim",
            ]
        );
    }

    #[test]
    fn test_name_at_width_boundary_untouched() {
        let name = "a".repeat(MAX_NAME_LENGTH);
        assert_eq!(normalize(&[name.as_str()]), vec![name.clone()]);
    }

    #[test]
    fn test_indices_restart_per_name() {
        assert_eq!(
            normalize(&["a", "b", "a", "c", "b"]),
            vec!["(1) a", "(1) b", "(2) a", "c", "(2) b"]
        );
    }

    #[test]
    fn test_two_digit_prefix_shrinks_name() {
        let long = "x".repeat(40);
        let names: Vec<&str> = std::iter::repeat(long.as_str()).take(10).collect();
        let out = normalize(&names);
        assert_eq!(out[8], format!("(9) {}", "x".repeat(28)));
        assert_eq!(out[9], format!("(10) {}", "x".repeat(27)));
        assert!(out.iter().all(|n| n.chars().count() <= MAX_NAME_LENGTH));
    }

    #[test]
    fn test_multibyte_names_crop_on_char_boundary() {
        let name = "é".repeat(40);
        let out = normalize(&[name.as_str()]);
        assert_eq!(out[0].chars().count(), MAX_NAME_LENGTH);
    }

    #[test]
    fn test_generated_label_lookalike_is_relabelled() {
        let out = normalize(&["(1) x", "x", "x"]);
        assert_eq!(out, vec!["(1) x", "(3) x", "(2) x"]);
    }

    #[test]
    fn test_repeats_differing_after_prefix_room_stay_unique() {
        // Two self-play pairs whose names only differ past character 28.
        let v1 = "league_exp_2026_10_19_policy_v1";
        let v2 = "league_exp_2026_10_19_policy_v2";
        let out = normalize(&[v1, v1, v2, v2]);
        assert_eq!(
            out,
            vec![
                "(1) league_exp_2026_10_19_policy",
                "(2) league_exp_2026_10_19_policy",
                "(3) league_exp_2026_10_19_policy",
                "(4) league_exp_2026_10_19_policy",
            ]
        );
        assert_unique(&out);
    }

    #[test]
    fn test_relabelling_never_steals_a_later_label() {
        let out = normalize(&["(1) x", "x", "x", "(3) x"]);
        assert_eq!(out, vec!["(1) x", "(4) x", "(2) x", "(3) x"]);
    }
}
