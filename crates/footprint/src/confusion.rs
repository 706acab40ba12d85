//! Confusion matrix of ground-truth labels against predicted classes.

use std::collections::BTreeSet;

use serde::Serialize;

/// `counts[i][j]` is the number of rows whose actual class is `classes[i]`
/// and whose predicted class is `classes[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub classes: Vec<u32>,
    pub counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    /// Tally `(actual, predicted)` pairs. Classes are the sorted union of both columns.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let pairs: Vec<(u32, u32)> = pairs.into_iter().collect();

        let classes: Vec<u32> = pairs
            .iter()
            .flat_map(|&(a, p)| [a, p])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut counts = vec![vec![0u64; classes.len()]; classes.len()];
        for (actual, predicted) in pairs {
            // Both are present in `classes` by construction.
            if let (Ok(i), Ok(j)) = (classes.binary_search(&actual), classes.binary_search(&predicted)) {
                counts[i][j] += 1;
            }
        }

        Self { classes, counts }
    }

    fn index_of(&self, class: u32) -> Option<usize> {
        self.classes.binary_search(&class).ok()
    }

    pub fn get(&self, actual: u32, predicted: u32) -> u64 {
        match (self.index_of(actual), self.index_of(predicted)) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn correct(&self) -> u64 {
        (0..self.classes.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Fraction of rows on the diagonal; `None` when the matrix is empty.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.correct() as f64 / total as f64)
    }

    /// Of the rows predicted as `class`, the fraction that really are `class`.
    pub fn precision(&self, class: u32) -> Option<f64> {
        let j = self.index_of(class)?;
        let predicted: u64 = self.counts.iter().map(|row| row[j]).sum();
        (predicted > 0).then(|| self.counts[j][j] as f64 / predicted as f64)
    }

    /// Of the rows that really are `class`, the fraction predicted as `class`.
    pub fn recall(&self, class: u32) -> Option<f64> {
        let i = self.index_of(class)?;
        let actual: u64 = self.counts[i].iter().sum();
        (actual > 0).then(|| self.counts[i][i] as f64 / actual as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
