#![forbid(unsafe_code)]

//! Observation options.

/// Tunables for a chain observation.
///
/// # Defaults
///
/// | Field | Default | Effect |
/// |-------|---------|--------|
/// | `skip_initial` | `false` | suppress the emission produced on subscribe |
/// | `distinct` | `true` | suppress values equal to the previous emission |
///
/// With `skip_initial`, the initial value still seeds deduplication: the
/// first delivered emission is the first one that differs from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveOptions {
    pub skip_initial: bool,
    pub distinct: bool,
}

impl ObserveOptions {
    /// Defaults: emit initial value, deduplicate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            skip_initial: false,
            distinct: true,
        }
    }

    /// Set whether the subscribe-time emission is suppressed.
    #[must_use]
    pub const fn with_skip_initial(mut self, skip: bool) -> Self {
        self.skip_initial = skip;
        self
    }

    /// Set whether consecutive duplicates are suppressed.
    #[must_use]
    pub const fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self::new()
    }
}
