//! Parallelism configuration for per-folder execution.
//!
//! Controls how many tool processes may run at once. In `run --all` mode the
//! same bound is forwarded to Terragrunt's own `--parallelism` flag instead.

/// Upper bound accepted for `max_parallel`.
pub const MAX_PARALLELISM: usize = 50;

fn default_max_parallel() -> usize {
    5
}

/// Bounded-parallelism settings.
///
/// # Example
///
/// ```rust
/// use terragrunt_runner::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_parallel: 0,
/// };
/// // Zero means one slot per folder.
/// assert_eq!(config.effective_width(7), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Run folders concurrently (default: true)
    ///
    /// When disabled, folders run one at a time in input order.
    pub enabled: bool,

    /// Maximum concurrent tool processes (default: 5, 0 = one per folder)
    pub max_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_parallel: default_max_parallel(),
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with parallel execution disabled.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a config limited to `max_parallel` concurrent processes.
    pub fn bounded(max_parallel: usize) -> Self {
        Self {
            enabled: true,
            max_parallel,
        }
    }

    /// Number of concurrent slots for `units` execution units.
    ///
    /// Never exceeds the unit count and never drops below one.
    pub fn effective_width(&self, units: usize) -> usize {
        let width = match self.max_parallel {
            0 => units,
            n => n.min(units),
        };
        width.max(1)
    }

    /// Whether `units` units should be spread across worker threads.
    pub fn runs_in_parallel(&self, units: usize) -> bool {
        self.enabled && units > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_config_default() {
        let config = ParallelConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_parallel, 5);
    }

    #[test]
    fn test_parallel_config_sequential() {
        let config = ParallelConfig::sequential();
        assert!(!config.enabled);
        assert!(!config.runs_in_parallel(10));
    }

    #[test]
    fn test_effective_width() {
        assert_eq!(ParallelConfig::bounded(4).effective_width(10), 4);
        assert_eq!(ParallelConfig::bounded(4).effective_width(2), 2);
        assert_eq!(ParallelConfig::bounded(0).effective_width(9), 9);
        assert_eq!(ParallelConfig::bounded(0).effective_width(0), 1);
    }

    #[test]
    fn test_single_unit_runs_inline() {
        assert!(!ParallelConfig::default().runs_in_parallel(1));
        assert!(ParallelConfig::default().runs_in_parallel(2));
    }
}
