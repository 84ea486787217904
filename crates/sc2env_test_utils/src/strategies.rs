//! Proptest strategies for agent names.

use proptest::prelude::*;

/// A short ASCII agent name.
pub fn arb_short_name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,12}"
}

/// An agent name long enough to be cropped.
pub fn arb_long_name() -> impl Strategy<Value = String> {
    "[a-z_]{33,60}"
}

/// Any agent name, including multi-byte characters.
pub fn arb_agent_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_short_name(),
        2 => arb_long_name(),
        1 => "\\PC{0,40}".prop_filter("labels are generated, not supplied", |s| !s.starts_with('(')),
    ]
}

/// A batch of agent names with deliberate repeats.
///
/// Draws from a small pool so that duplicates are common.
pub fn arb_name_batch(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_short_name(), 1..4).prop_flat_map(move |pool| {
        let pick = proptest::sample::select(pool);
        proptest::collection::vec(pick, 0..max_len)
    })
}

/// A batch of repeated names that share a long common prefix.
///
/// The prefix is 28 to 32 characters, so names differ only around the
/// point where prefixed labels get cropped.
pub fn arb_long_repeated_batch(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    (
        "[a-z_]{28,32}",
        proptest::collection::vec("[a-z0-9]{0,6}", 1..5),
    )
        .prop_flat_map(move |(prefix, suffixes)| {
            let pool: Vec<String> = suffixes.iter().map(|s| format!("{prefix}{s}")).collect();
            proptest::collection::vec(proptest::sample::select(pool), 0..max_len)
        })
}
