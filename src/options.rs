//! Translation options.

/// Switches consumed by the translator. Defaults match the permissive
/// behavior: `any` sentinels stay `any`, unreachable definitions are
/// dropped rather than surfaced as interface params.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Replace every ANY sentinel with UNKNOWN throughout the output.
    pub unknown_any: bool,

    /// Surface each `definitions` child as a param of its parent
    /// interface (marked `is_unreachable_definition`).
    pub unreachable_definitions: bool,
}
