//! Pure frame transforms: derived sum columns and the binary quality label.

use crate::common::error::{Error, Result};
use crate::data::domain::{Column, Frame};

use super::domain::{
    ACIDITY_COLUMNS, ENGINEERED_FEATURE_COLUMNS, LABEL_COLUMN, QUALITY_THRESHOLD, SULFUR_COLUMNS,
    SULPHUR_BOUND, TOTAL_ACIDITY,
};

/// Add `new_name = columns[0] + columns[1]` and drop both sources.
///
/// Exactly two source names are accepted. Both must be present for the sum;
/// the drop afterwards ignores names that are already gone.
pub fn sum_and_drop(mut frame: Frame, columns: &[&str], new_name: &str) -> Result<Frame> {
    let [a, b] = columns else {
        return Err(Error::config(format!(
            "sum_and_drop needs exactly 2 source columns, got {}",
            columns.len()
        )));
    };

    let summed: Vec<f64> = frame
        .require(a)?
        .iter()
        .zip(frame.require(b)?)
        .map(|(x, y)| x + y)
        .collect();

    frame.insert(Column::new(new_name, summed))?;
    frame.drop_columns(columns);
    Ok(frame)
}

/// Replace `target` with a 0/1 `quality_label` column (1 iff value >= 6).
pub fn binarize_target(mut frame: Frame, target: &str) -> Result<Frame> {
    let labels: Vec<f64> = frame
        .require(target)?
        .iter()
        .map(|&v| if v >= QUALITY_THRESHOLD { 1.0 } else { 0.0 })
        .collect();

    frame.insert(Column::new(LABEL_COLUMN, labels))?;
    frame.drop_columns(&[target]);
    Ok(frame)
}

/// Raw features to model input: both derived sums, then the fixed column order.
pub fn engineer(frame: Frame) -> Result<Frame> {
    let frame = sum_and_drop(frame, &ACIDITY_COLUMNS, TOTAL_ACIDITY)?;
    let frame = sum_and_drop(frame, &SULFUR_COLUMNS, SULPHUR_BOUND)?;
    frame.select(&ENGINEERED_FEATURE_COLUMNS)
}

/// Read a label column back as class ids.
pub fn labels_from(frame: &Frame, column: &str) -> Result<Vec<u8>> {
    frame
        .require(column)?
        .iter()
        .map(|&v| match v {
            v if v == 0.0 => Ok(0),
            v if v == 1.0 => Ok(1),
            other => Err(Error::MalformedData {
                column: column.to_string(),
                reason: format!("label {other} is not 0 or 1"),
            }),
        })
        .collect()
}
