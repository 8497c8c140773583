//! Run configuration for the assembler.

/// Slugs processed in parallel unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What to assemble and how wide to fan out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Plugin slugs in display order before sorting. Duplicates are kept.
    pub slugs: Vec<String>,
    /// Maximum number of slugs fetched at once (at least 1).
    pub concurrency: usize,
}

impl DashboardConfig {
    pub fn new(slugs: Vec<String>) -> Self {
        Self {
            slugs,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Split a comma-separated slug list, e.g. the `PLUGINS` variable.
///
/// Entries are trimmed and blank entries dropped; order and duplicates are
/// preserved.
pub fn parse_slug_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_order() {
        assert_eq!(
            parse_slug_list(" media-cleaner, wp-retina-2x ,ai-engine"),
            vec!["media-cleaner", "wp-retina-2x", "ai-engine"]
        );
    }

    #[test]
    fn keeps_duplicates_and_drops_blanks() {
        assert_eq!(parse_slug_list("a,,b, ,a,"), vec!["a", "b", "a"]);
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_slug_list("").is_empty());
        assert!(parse_slug_list(" , ").is_empty());
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let config = DashboardConfig::new(vec![]).with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }
}
