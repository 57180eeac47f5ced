//! Request-side types for single-record prediction.

use std::collections::BTreeMap;

/// One raw wine record keyed by column name.
pub type RawRecord = BTreeMap<String, f64>;

/// The 11 form fields in display order, pre-filled with a red wine sample.
pub const INPUT_FEATURES: [(&str, f64); 11] = [
    ("fixed acidity", 7.4),
    ("volatile acidity", 0.70),
    ("citric acid", 0.00),
    ("residual sugar", 1.9),
    ("chlorides", 0.076),
    ("free sulfur dioxide", 11.0),
    ("total sulfur dioxide", 34.0),
    ("density", 0.9978),
    ("pH", 3.51),
    ("sulphates", 0.56),
    ("alcohol", 9.4),
];

/// The sample record behind [`INPUT_FEATURES`].
pub fn sample_record() -> RawRecord {
    INPUT_FEATURES
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

/// Binary quality class as shown to users.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QualityClass {
    Low,
    High,
}

impl QualityClass {
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            QualityClass::High
        } else {
            QualityClass::Low
        }
    }

    pub fn label(self) -> u8 {
        match self {
            QualityClass::Low => 0,
            QualityClass::High => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityClass::Low => "LOW Quality",
            QualityClass::High => "HIGH Quality",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::domain::RAW_FEATURE_COLUMNS;

    #[test]
    fn form_fields_follow_raw_column_order() {
        let names: Vec<&str> = INPUT_FEATURES.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, RAW_FEATURE_COLUMNS.to_vec());
        assert_eq!(sample_record()["density"], 0.9978);
    }

    #[test]
    fn quality_class_labels() {
        assert_eq!(QualityClass::from_label(1), QualityClass::High);
        assert_eq!(QualityClass::from_label(0).as_str(), "LOW Quality");
        assert_eq!(QualityClass::High.label(), 1);
    }
}
