//! Summary statistics over a completed job's results.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Category, ResultRecord};

/// Aggregate figures shown above the result table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Counts per recognized category. Categories with no records are absent.
    pub by_category: BTreeMap<Category, usize>,
    pub residential: usize,
    /// Any `commercial-*` category.
    pub commercial: usize,
    pub mixed: usize,
    /// Records without a category, typically per-row failures.
    pub unclassified: usize,
    /// Records whose category label is not in the known set.
    pub unrecognized: usize,
    pub with_errors: usize,
    /// Number of records that carried a ratio estimate.
    pub ratio_samples: usize,
    /// Mean ratio estimate over `ratio_samples` records; 0 when there are none.
    pub average_ratio: f64,
}

impl Summary {
    /// Average ratio rounded to a whole percent.
    pub fn rounded_average(&self) -> u32 {
        self.average_ratio.max(0.0).round() as u32
    }
}

/// Computes the summary of a result collection.
///
/// Records without a ratio estimate are left out of the average entirely.
pub fn summarize(records: &[ResultRecord]) -> Summary {
    let mut summary = Summary {
        total: records.len(),
        ..Summary::default()
    };
    let mut ratio_sum = 0.0;

    for record in records {
        match &record.category {
            None => summary.unclassified += 1,
            Some(category) if !category.is_recognized() => summary.unrecognized += 1,
            Some(category) => {
                *summary.by_category.entry(category.clone()).or_default() += 1;
                if category.is_commercial() {
                    summary.commercial += 1;
                } else if *category == Category::Residential {
                    summary.residential += 1;
                } else if *category == Category::Mixed {
                    summary.mixed += 1;
                }
            }
        }

        if record.error.is_some() {
            summary.with_errors += 1;
        }

        if let Some(ratio) = record.ratio_estimate.filter(|r| r.is_finite()) {
            ratio_sum += ratio;
            summary.ratio_samples += 1;
        }
    }

    if summary.ratio_samples > 0 {
        summary.average_ratio = ratio_sum / summary.ratio_samples as f64;
    }

    summary
}
