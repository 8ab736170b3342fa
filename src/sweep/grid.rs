use std::collections::BTreeSet;

use log::warn;

use super::model::{Axis, AxisValue, Combination, Dataset, InferenceMethod, Prior};

// ---------------------------------------------------------------------------
// SweepGrid – the five axis lists plus a replicate count
// ---------------------------------------------------------------------------

/// The fixed lists a sweep is enumerated from.
///
/// Each axis is duplicate-free, so every combination produced by
/// [`SweepGrid::combinations`] is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    priors: Vec<Prior>,
    scales: Vec<f64>,
    datasets: Vec<Dataset>,
    inference: Vec<InferenceMethod>,
    temperatures: Vec<f64>,
    replicates: usize,
}

impl SweepGrid {
    /// Build a grid, dropping repeated entries within an axis (first one wins).
    pub fn new(
        priors: Vec<Prior>,
        scales: Vec<f64>,
        datasets: Vec<Dataset>,
        inference: Vec<InferenceMethod>,
        temperatures: Vec<f64>,
        replicates: usize,
    ) -> Self {
        let replicates = if replicates == 0 {
            warn!("replicates = 0 requested, using 1");
            1
        } else {
            replicates
        };
        Self {
            priors: dedup_axis(Axis::Prior, priors, |p| AxisValue::Prior(*p)),
            scales: dedup_axis(Axis::Scale, scales, |v| AxisValue::Number(*v)),
            datasets: dedup_axis(Axis::Dataset, datasets, |d| AxisValue::Dataset(d.clone())),
            inference: dedup_axis(Axis::Inference, inference, |m| AxisValue::Inference(*m)),
            temperatures: dedup_axis(Axis::Temperature, temperatures, |v| {
                AxisValue::Number(*v)
            }),
            replicates,
        }
    }

    pub fn priors(&self) -> &[Prior] {
        &self.priors
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn inference(&self) -> &[InferenceMethod] {
        &self.inference
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// All values present on one axis, for validating selections.
    pub fn axis_values(&self, axis: Axis) -> BTreeSet<AxisValue> {
        match axis {
            Axis::Prior => self.priors.iter().map(|p| AxisValue::Prior(*p)).collect(),
            Axis::Scale => self.scales.iter().map(|v| AxisValue::Number(*v)).collect(),
            Axis::Dataset => self
                .datasets
                .iter()
                .map(|d| AxisValue::Dataset(d.clone()))
                .collect(),
            Axis::Inference => self
                .inference
                .iter()
                .map(|m| AxisValue::Inference(*m))
                .collect(),
            Axis::Temperature => self
                .temperatures
                .iter()
                .map(|v| AxisValue::Number(*v))
                .collect(),
        }
    }

    /// Number of combinations (including replicates).
    pub fn len(&self) -> usize {
        self.priors.len()
            * self.scales.len()
            * self.datasets.len()
            * self.inference.len()
            * self.temperatures.len()
            * self.replicates
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate the Cartesian product.
    ///
    /// Loop order, outermost first: prior, scale, dataset, inference,
    /// temperature, replicate.
    pub fn combinations(&self) -> Vec<Combination> {
        let mut out = Vec::with_capacity(self.len());
        for prior in &self.priors {
            for scale in &self.scales {
                for dataset in &self.datasets {
                    for inference in &self.inference {
                        for temperature in &self.temperatures {
                            for replicate in 0..self.replicates {
                                out.push(Combination {
                                    prior: *prior,
                                    scale: *scale,
                                    dataset: dataset.clone(),
                                    inference: *inference,
                                    temperature: *temperature,
                                    replicate,
                                });
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

fn dedup_axis<T>(axis: Axis, values: Vec<T>, key: impl Fn(&T) -> AxisValue) -> Vec<T> {
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .filter(|v| {
            let k = key(v);
            if seen.contains(&k) {
                warn!("dropping duplicate {axis} value {k}");
                false
            } else {
                seen.insert(k);
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(name: &str) -> Dataset {
        Dataset::new(name).unwrap()
    }

    fn small_grid(replicates: usize) -> SweepGrid {
        SweepGrid::new(
            vec![Prior::Gaussian, Prior::Laplace],
            vec![1.0, 1.41],
            vec![ds("mnist")],
            vec![InferenceMethod::Sgld, InferenceMethod::VerletSgld],
            vec![0.1, 1.0],
            replicates,
        )
    }

    #[test]
    fn len_is_product_of_axes() {
        assert_eq!(small_grid(1).len(), 2 * 2 * 1 * 2 * 2);
        assert_eq!(small_grid(3).len(), 16 * 3);
        assert_eq!(small_grid(3).combinations().len(), 48);
    }

    #[test]
    fn combinations_are_unique() {
        let combos = small_grid(2).combinations();
        for (i, a) in combos.iter().enumerate() {
            for b in &combos[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn prior_is_outermost_and_temperature_innermost() {
        let combos = small_grid(1).combinations();
        assert_eq!(combos[0].prior, Prior::Gaussian);
        assert_eq!(combos[0].temperature, 0.1);
        assert_eq!(combos[1].temperature, 1.0);
        assert_eq!(combos[1].inference, InferenceMethod::Sgld);
        assert_eq!(combos[2].inference, InferenceMethod::VerletSgld);
        assert_eq!(combos[8].prior, Prior::Laplace);
    }

    #[test]
    fn duplicates_within_an_axis_are_dropped() {
        let grid = SweepGrid::new(
            vec![Prior::Gaussian, Prior::Gaussian],
            vec![1.0, 1.0, 2.0],
            vec![ds("mnist"), ds("mnist")],
            vec![InferenceMethod::Sgld],
            vec![1.0],
            1,
        );
        assert_eq!(grid.priors(), &[Prior::Gaussian]);
        assert_eq!(grid.scales(), &[1.0, 2.0]);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn empty_axis_gives_empty_sweep() {
        let grid = SweepGrid::new(
            vec![Prior::Gaussian],
            vec![],
            vec![ds("mnist")],
            vec![InferenceMethod::Sgld],
            vec![1.0],
            1,
        );
        assert!(grid.is_empty());
        assert!(grid.combinations().is_empty());
    }

    #[test]
    fn zero_replicates_means_one() {
        assert_eq!(small_grid(0).replicates(), 1);
    }
}
