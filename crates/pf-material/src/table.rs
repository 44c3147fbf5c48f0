//! Cumulative spectral sampling tables.
//!
//! A `SpectralTable` maps one uniform random draw in [0, 1) to a
//! (wavevector bin, branch) pair. Tables are built once per run from
//! non-negative spectral weights and consulted from the hot loop with a
//! binary search; bins with zero weight never appear in a table.

use crate::dispersion::Polarization;

#[derive(Clone, Copy, Debug)]
struct TableEntry {
    /// Normalized cumulative probability up to and including this entry.
    cum: f64,
    bin: usize,
    polarization: Polarization,
}

/// Normalized cumulative distribution over (bin, branch) pairs.
#[derive(Clone, Debug, Default)]
pub struct SpectralTable {
    entries: Vec<TableEntry>,
}

impl SpectralTable {
    /// Build a table from (bin, branch, weight) triples.
    ///
    /// Zero weights are dropped; if every weight is zero the table is empty
    /// and `sample` returns `None`.
    pub(crate) fn from_weights(
        weights: impl IntoIterator<Item = (usize, Polarization, f64)>,
    ) -> Self {
        let mut entries = Vec::new();
        let mut running = 0.0;
        for (bin, polarization, weight) in weights {
            if weight > 0.0 && weight.is_finite() {
                running += weight;
                entries.push(TableEntry {
                    cum: running,
                    bin,
                    polarization,
                });
            }
        }
        if running > 0.0 {
            for entry in &mut entries {
                entry.cum /= running;
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Map a uniform draw in [0, 1) to a (bin, branch) pair.
    pub fn sample(&self, r: f64) -> Option<(usize, Polarization)> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = self.entries.partition_point(|e| e.cum <= r);
        let entry = self.entries[idx.min(self.entries.len() - 1)];
        Some((entry.bin, entry.polarization))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_bin_table() -> SpectralTable {
        SpectralTable::from_weights([
            (0, Polarization::La, 3.0),
            (1, Polarization::Ta, 1.0),
        ])
    }

    #[test]
    fn sample_respects_weight_partition() {
        let table = two_bin_table();
        assert_eq!(table.sample(0.0), Some((0, Polarization::La)));
        assert_eq!(table.sample(0.74), Some((0, Polarization::La)));
        assert_eq!(table.sample(0.76), Some((1, Polarization::Ta)));
    }

    #[test]
    fn zero_weights_are_dropped() {
        let table = SpectralTable::from_weights([
            (0, Polarization::La, 0.0),
            (7, Polarization::La, 2.0),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.sample(0.5), Some((7, Polarization::La)));
    }

    #[test]
    fn all_zero_weights_give_empty_table() {
        let table = SpectralTable::from_weights([(0, Polarization::La, 0.0)]);
        assert!(table.is_empty());
        assert_eq!(table.sample(0.5), None);
    }

    proptest! {
        #[test]
        fn any_draw_lands_in_the_table(r in 0.0f64..1.0) {
            let table = two_bin_table();
            let (bin, _) = table.sample(r).unwrap();
            prop_assert!(bin <= 1);
        }
    }
}
