//! Standalone-name generation.
//!
//! Seeds come from `title`, `$id`, a definition key, or a property key,
//! in that order of preference (the caller picks the seed). This module
//! only sanitizes the seed and makes it unique within one translation run.

use std::collections::HashSet;

/// Fallback for seeds that sanitize to nothing (e.g. `"$$$"`).
const EMPTY_SEED_NAME: &str = "NoName";

/// Sanitize a seed to the target naming alphabet: split on anything that
/// is not alphanumeric, upper-case each word head, join. A leading digit
/// gets an underscore prefix so the result is identifier-safe.
pub fn to_safe_string(seed: &str) -> String {
    let mut out = String::with_capacity(seed.len());
    let mut word_start = true;
    for c in seed.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
                word_start = false;
            } else {
                out.push(c);
            }
        } else {
            word_start = true;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Produce a unique identifier from `seed`, inserting it into `used`.
/// Collisions get a monotonically increasing integer suffix.
pub fn generate_name(seed: &str, used: &mut HashSet<String>) -> String {
    let mut name = to_safe_string(seed);
    if name.is_empty() {
        name = EMPTY_SEED_NAME.to_string();
    }
    if used.contains(&name) {
        let mut counter = 1u32;
        while used.contains(&format!("{name}{counter}")) {
            counter += 1;
        }
        name = format!("{name}{counter}");
    }
    used.insert(name.clone());
    name
}
