use std::collections::HashMap;

/// Code assigned to any categorical value the encoder never saw during training.
pub const UNKNOWN_CATEGORY: i64 = -1;

/// A fitted categorical-to-integer mapping for a single feature.
///
/// The code of a category is its position in the fitted `classes` list, which
/// matches how a label encoder assigns codes at training time. The mapping is
/// built once when artifacts are loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEncoder {
    codes: HashMap<String, i64>,
}

impl CategoryEncoder {
    /// Builds an encoder from its fitted classes.
    ///
    /// Returns the first duplicated category as the error, since a repeated
    /// class would make the code of that value ambiguous.
    pub fn from_classes(classes: Vec<String>) -> Result<Self, String> {
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.into_iter().enumerate() {
            if codes.contains_key(&class) {
                return Err(class);
            }
            codes.insert(class, code as i64);
        }
        Ok(Self { codes })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    /// Learned code for a known category, `None` otherwise.
    pub fn transform(&self, value: &str) -> Option<i64> {
        self.codes.get(value).copied()
    }

    /// Learned code for `value`, or [`UNKNOWN_CATEGORY`] when the value is
    /// outside the fitted vocabulary.
    ///
    /// Matching is exact: no trimming or case folding is applied, so `" Acme"`
    /// and `"acme"` are unknown when only `"Acme"` was fitted.
    pub fn safe_encode(&self, value: &str) -> i64 {
        self.transform(value).unwrap_or(UNKNOWN_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> CategoryEncoder {
        CategoryEncoder::from_classes(vec!["Acme".into(), "Globex".into(), "Initech".into()]).unwrap()
    }

    #[test]
    fn test_known_values_use_fitted_position() {
        let encoder = brands();
        assert_eq!(encoder.safe_encode("Acme"), 0);
        assert_eq!(encoder.safe_encode("Globex"), 1);
        assert_eq!(encoder.safe_encode("Initech"), 2);
    }

    #[test]
    fn test_unknown_values_fall_back_to_sentinel() {
        let encoder = brands();
        assert_eq!(encoder.safe_encode("Umbrella"), UNKNOWN_CATEGORY);
        assert_eq!(encoder.safe_encode(""), UNKNOWN_CATEGORY);
        assert_eq!(encoder.safe_encode("acme"), UNKNOWN_CATEGORY);
        assert_eq!(encoder.safe_encode(" Acme"), UNKNOWN_CATEGORY);
        assert_eq!(encoder.safe_encode("Acme "), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_duplicate_classes_rejected() {
        let result = CategoryEncoder::from_classes(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(result.unwrap_err(), "a");
    }

    #[test]
    fn test_len_counts_fitted_classes() {
        assert_eq!(brands().len(), 3);
        assert!(CategoryEncoder::from_classes(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_string_can_be_a_fitted_class() {
        let encoder = CategoryEncoder::from_classes(vec!["".into(), "x".into()]).unwrap();
        assert_eq!(encoder.safe_encode(""), 0);
        assert!(encoder.contains(""));
    }
}
