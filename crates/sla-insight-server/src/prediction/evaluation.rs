use serde::{Deserialize, Serialize};

/// Hold-out evaluation of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub auc: f64,
    pub f1: f64,
    /// `[[tn, fp], [fn, tp]]`
    pub confusion_matrix: [[u64; 2]; 2],
}

/// Area under the ROC curve via the rank-sum statistic, ties averaged.
/// `None` when only one class is present.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|&&y| y).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 || labels.len() != scores.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // 1-based ranks start..=end share their mean
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            ranks[i] = rank;
        }
        start = end + 1;
    }

    let positive_rank_sum: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|&(_, &y)| y)
        .map(|(r, _)| r)
        .sum();
    let (p, n) = (positives as f64, negatives as f64);
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

pub fn confusion_matrix(labels: &[bool], predictions: &[bool]) -> [[u64; 2]; 2] {
    let mut matrix = [[0u64; 2]; 2];
    for (&actual, &predicted) in labels.iter().zip(predictions) {
        matrix[usize::from(actual)][usize::from(predicted)] += 1;
    }
    matrix
}

/// F1 of the positive class; 0.0 when there are no true positives.
pub fn f1_score(labels: &[bool], predictions: &[bool]) -> f64 {
    let [[_, fp], [fn_, tp]] = confusion_matrix(labels, predictions);
    if tp == 0 {
        return 0.0;
    }
    let tp = tp as f64;
    2.0 * tp / (2.0 * tp + fp as f64 + fn_ as f64)
}
