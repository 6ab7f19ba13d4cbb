//! Template matching of a query image against the normalized fingerprints.

use crate::dataset::{RawDataset, CLASSES};
use crate::error::ClassifyError;
use crate::fingerprint::NormalizedTable;

/// Scores of one query against every class.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    scores: [f64; CLASSES],
    best: usize,
}

impl Classification {
    pub fn scores(&self) -> &[f64; CLASSES] {
        &self.scores
    }

    /// Highest-scoring class; ties go to the lowest digit.
    pub fn best_class(&self) -> usize {
        self.best
    }

    /// Scores divided by their sum. For display only, these are not
    /// calibrated probabilities.
    pub fn probabilities(&self) -> [f64; CLASSES] {
        let total: f64 = self.scores.iter().sum();
        if total == 0.0 {
            return [0.0; CLASSES];
        }
        self.scores.map(|s| s / total)
    }
}

impl NormalizedTable {
    /// Scores `query` (raw intensities, nominally `0..=255`) against each class:
    /// `sum_j 1 - |fingerprint[j] - query[j] / 256|`.
    pub fn classify(&self, query: &[f64]) -> Result<Classification, ClassifyError> {
        let width = self.width();
        if query.len() < width {
            return Err(ClassifyError::QueryTooShort {
                len: query.len(),
                expected: width,
            });
        }

        let mut scores = [0.0; CLASSES];
        for (digit, score) in scores.iter_mut().enumerate() {
            *score = self
                .class(digit)
                .iter()
                .zip(query)
                .map(|(&f, &q)| 1.0 - (f - q / 256.0).abs())
                .sum();
        }

        let mut best = 0;
        for (digit, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = digit;
            }
        }
        Ok(Classification { scores, best })
    }

    /// Classifies a raw byte image.
    pub fn classify_bytes(&self, image: &[u8]) -> Result<Classification, ClassifyError> {
        let query: Vec<f64> = image.iter().map(|&p| p as f64).collect();
        self.classify(&query)
    }
}

/// Hit count of [`NormalizedTable::classify`] over a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
}

impl Evaluation {
    /// Percentage of correctly classified images.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }
}

pub fn evaluate(table: &NormalizedTable, dataset: &RawDataset) -> Result<Evaluation, ClassifyError> {
    let mut eval = Evaluation::default();
    for (label, image) in dataset.iter() {
        let result = table.classify_bytes(image)?;
        if result.best_class() == label as usize {
            eval.correct += 1;
        }
        eval.total += 1;
    }
    Ok(eval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{encode_images, encode_labels};
    use crate::fingerprint::FingerprintTable;

    fn table(labels: &[u8], images: &[&[u8]]) -> NormalizedTable {
        let dataset =
            RawDataset::from_bytes(&encode_images(2, 2, images), &encode_labels(labels)).unwrap();
        FingerprintTable::accumulate(&dataset).normalize()
    }

    fn ten_classes() -> NormalizedTable {
        let images: Vec<Vec<u8>> = (0..10u8)
            .map(|d| vec![d * 25, 255 - d * 25, (d % 3) * 100, (d % 4) * 60])
            .collect();
        let refs: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();
        table(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], &refs)
    }

    #[test]
    fn fingerprint_scaled_back_is_its_own_class() {
        let table = ten_classes();
        for k in 0..CLASSES {
            let query: Vec<f64> = table.class(k).iter().map(|v| v * 256.0).collect();
            let result = table.classify(&query).unwrap();

            assert_eq!(result.best_class(), k);
            assert!((result.scores()[k] - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ties_go_to_lowest_class() {
        // Empty classes all score the same against a black query.
        let table = table(&[7], &[&[255, 255, 255, 255]]);
        let result = table.classify(&[0.0; 4]).unwrap();

        assert_eq!(result.best_class(), 0);
        assert_eq!(result.scores()[0], 4.0);
        assert!(result.scores()[7] < 4.0);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let table = ten_classes();
        let result = table.classify(&[12.0, 200.0, 0.0, 90.0]).unwrap();
        let total: f64 = result.probabilities().iter().sum();

        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn short_query_is_rejected() {
        let table = ten_classes();
        let err = table.classify(&[0.0; 3]).unwrap_err();

        assert_eq!(err, ClassifyError::QueryTooShort { len: 3, expected: 4 });
    }

    #[test]
    fn evaluates_training_set() {
        let images: [&[u8]; 2] = [&[255, 255, 0, 0], &[0, 0, 255, 255]];
        let labels = [3, 8];
        let dataset =
            RawDataset::from_bytes(&encode_images(2, 2, &images), &encode_labels(&labels)).unwrap();
        let normalized = FingerprintTable::accumulate(&dataset).normalize();
        let eval = evaluate(&normalized, &dataset).unwrap();

        assert_eq!(eval, Evaluation { correct: 2, total: 2 });
        assert_eq!(eval.accuracy(), 100.0);
    }
}
