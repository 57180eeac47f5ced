//! Column schema shared by the offline pipeline and the prediction service.

/// The 11 physicochemical inputs, in raw file order.
pub const RAW_FEATURE_COLUMNS: [&str; 11] = [
    "fixed acidity",
    "volatile acidity",
    "citric acid",
    "residual sugar",
    "chlorides",
    "free sulfur dioxide",
    "total sulfur dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
];

pub const ACIDITY_COLUMNS: [&str; 2] = ["fixed acidity", "volatile acidity"];
pub const SULFUR_COLUMNS: [&str; 2] = ["free sulfur dioxide", "total sulfur dioxide"];

pub const TOTAL_ACIDITY: &str = "total acidity";
pub const SULPHUR_BOUND: &str = "sulphur bound";

pub const TARGET_COLUMN: &str = "quality";
pub const LABEL_COLUMN: &str = "quality_label";

/// Scores at or above this are labelled high quality.
pub const QUALITY_THRESHOLD: f64 = 6.0;

/// Model input schema. Order matters.
pub const ENGINEERED_FEATURE_COLUMNS: [&str; 9] = [
    "citric acid",
    "residual sugar",
    "chlorides",
    "density",
    "pH",
    "sulphates",
    "alcohol",
    TOTAL_ACIDITY,
    SULPHUR_BOUND,
];

/// Owned copy of [`ENGINEERED_FEATURE_COLUMNS`], as stored in model artefacts.
pub fn engineered_feature_names() -> Vec<String> {
    ENGINEERED_FEATURE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect()
}
