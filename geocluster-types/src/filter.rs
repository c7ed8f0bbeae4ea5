use serde::{Deserialize, Serialize};

/// Suffix of the per-question response count column.
pub const TOTAL_RESPONSES_SUFFIX: &str = "total_responses";

/// Selects which pair of properties feeds the per-cluster percentage.
///
/// The numerator column is `"<primary>_<secondary>"` and the denominator column
/// is `"<primary>_total_responses"`.
///
/// # Examples
///
/// ```
/// use geocluster_types::filter::FilterSpec;
///
/// let filter = FilterSpec::new("symptoms", "fever");
/// assert_eq!(filter.numerator_key(), "symptoms_fever");
/// assert_eq!(filter.denominator_key(), "symptoms_total_responses");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub primary: String,
    pub secondary: String,
}

impl FilterSpec {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Property name summed into the numerator.
    pub fn numerator_key(&self) -> String {
        format!("{}_{}", self.primary, self.secondary)
    }

    /// Property name summed into the denominator.
    pub fn denominator_key(&self) -> String {
        format!("{}_{}", self.primary, TOTAL_RESPONSES_SUFFIX)
    }

    /// True when either key is blank, in which case no property can match.
    pub fn is_empty(&self) -> bool {
        self.primary.trim().is_empty() || self.secondary.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let filter = FilterSpec::new("a", "b");
        assert_eq!(filter.numerator_key(), "a_b");
        assert_eq!(filter.denominator_key(), "a_total_responses");
        assert!(!filter.is_empty());
        assert!(FilterSpec::new(" ", "b").is_empty());
    }
}
