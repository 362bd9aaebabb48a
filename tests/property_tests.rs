//! Property-based tests for encoding and presentation
//!
//! - safe encoding agrees with the fitted codes and falls back to -1
//! - confidence always lies in [0, 100] and tracks the predicted class
//! - the label table is total over the three class ids

mod common;

use common::{store_with, valid_form, ScriptedModel};
use proptest::prelude::*;
use risklens::server::assess_form;
use risklens::{confidence_percent, CategoryEncoder, RiskAssessment, RiskLevel, UNKNOWN_CATEGORY};
use std::collections::BTreeSet;

// ============================================================================
// Strategies
// ============================================================================

/// Distinct category names, as a fitted encoder would hold them
fn arb_vocabulary() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[A-Za-z0-9 &>-]{0,12}", 1..20)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect())
}

/// A probability distribution over three classes
fn arb_distribution() -> impl Strategy<Value = Vec<f32>> {
    (0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0).prop_map(|(a, b, c)| {
        let total = a + b + c;
        if total == 0.0 {
            vec![1.0, 0.0, 0.0]
        } else {
            vec![a / total, b / total, c / total]
        }
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every fitted category encodes to its fitted position
    #[test]
    fn prop_known_values_match_transform(classes in arb_vocabulary()) {
        let encoder = CategoryEncoder::from_classes(classes.clone()).unwrap();
        for (code, class) in classes.iter().enumerate() {
            prop_assert_eq!(encoder.safe_encode(class), code as i64);
            prop_assert_eq!(Some(encoder.safe_encode(class)), encoder.transform(class));
        }
    }

    /// Property: anything outside the vocabulary encodes to the sentinel
    #[test]
    fn prop_unknown_values_get_sentinel(
        classes in arb_vocabulary(),
        candidate in "[A-Za-z0-9 &>-]{0,12}",
    ) {
        let encoder = CategoryEncoder::from_classes(classes.clone()).unwrap();
        let code = encoder.safe_encode(&candidate);
        if classes.contains(&candidate) {
            prop_assert!(code >= 0);
        } else {
            prop_assert_eq!(code, UNKNOWN_CATEGORY);
        }
    }

    /// Property: confidence is the predicted class probability, in [0, 100]
    #[test]
    fn prop_confidence_tracks_predicted_class(
        proba in arb_distribution(),
        class_id in 0i64..3,
    ) {
        let assessment = RiskAssessment::from_prediction(class_id, proba.clone()).unwrap();
        prop_assert!((0.0..=100.0).contains(&assessment.confidence));
        prop_assert_eq!(assessment.confidence, confidence_percent(proba[class_id as usize]));
        prop_assert!((assessment.confidence - f64::from(proba[class_id as usize]) * 100.0).abs() <= 0.05 + 1e-9);
    }

    /// Property: confidence never carries more than one decimal place
    #[test]
    fn prop_confidence_has_one_decimal(p in 0.0f32..=1.0) {
        let c = confidence_percent(p);
        prop_assert!((c * 10.0 - (c * 10.0).round()).abs() < 1e-9);
    }

    /// Property: every class id maps to one label with three lines each
    #[test]
    fn prop_label_table_is_total(class_id in 0i64..3) {
        let level = RiskLevel::from_class_id(class_id).unwrap();
        prop_assert_eq!(level.class_id() as i64, class_id);
        prop_assert_eq!(level.explanation().len(), 3);
        prop_assert_eq!(level.recommended_action().len(), 3);
    }

    /// Property: any brand string is accepted and only unknown ones become -1
    #[test]
    fn prop_any_brand_is_accepted(brand in "\\PC{0,16}") {
        let model = ScriptedModel::new(0, vec![0.6, 0.3, 0.1]);
        let store = store_with(model.clone());
        let mut form = valid_form();
        form.insert("brand_name".into(), brand.clone());

        prop_assert!(assess_form(&store, &form).is_ok());
        let expected = match brand.as_str() {
            "Acme" => 0.0,
            "Globex" => 1.0,
            "Initech" => 2.0,
            _ => -1.0,
        };
        prop_assert_eq!(model.last_vector().unwrap()[2], expected);
    }
}
