use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use super::grid::SweepGrid;
use super::model::{Axis, AxisValue, Combination};
use crate::error::{SweepError, SweepResult};

// ---------------------------------------------------------------------------
// Selection: which values are kept per axis
// ---------------------------------------------------------------------------

/// Per-axis selection state: maps axis → set of selected values.
/// An absent axis is unconstrained; a present axis with an empty set
/// selects nothing.
pub type Selection = BTreeMap<Axis, BTreeSet<AxisValue>>;

/// Parse a selector of the form `axis=v1,v2,...`.
pub fn parse_selector(raw: &str) -> SweepResult<(Axis, BTreeSet<AxisValue>)> {
    let (axis, values) = raw
        .split_once('=')
        .ok_or_else(|| SweepError::InvalidSelector(raw.to_string()))?;
    let axis: Axis = axis.parse()?;
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| axis.parse_value(v))
        .collect::<SweepResult<BTreeSet<_>>>()?;
    Ok((axis, values))
}

/// Fold several selectors into one [`Selection`]. Repeating an axis
/// unions its values.
pub fn build_selection<'a>(selectors: impl IntoIterator<Item = &'a str>) -> SweepResult<Selection> {
    let mut selection = Selection::new();
    for raw in selectors {
        let (axis, values) = parse_selector(raw)?;
        selection.entry(axis).or_default().extend(values);
    }
    Ok(selection)
}

/// Return the combinations of `grid` that pass every active axis filter.
///
/// Selected values that never occur in the grid are reported once, since
/// they usually indicate a typo in the selector.
pub fn selected(grid: &SweepGrid, selection: &Selection) -> Vec<Combination> {
    for (axis, wanted) in selection {
        let present = grid.axis_values(*axis);
        for value in wanted.difference(&present) {
            warn!("selector {axis}={value} matches nothing in the sweep");
        }
    }

    grid.combinations()
        .into_iter()
        .filter(|combo| {
            selection
                .iter()
                .all(|(axis, wanted)| wanted.contains(&combo.value(*axis)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::model::{Dataset, InferenceMethod, Prior};

    fn grid() -> SweepGrid {
        SweepGrid::new(
            vec![Prior::Gaussian, Prior::Laplace, Prior::StudentT],
            vec![1.41],
            vec![Dataset::new("mnist").unwrap(), Dataset::new("cifar10").unwrap()],
            vec![InferenceMethod::Sgld],
            vec![0.1, 1.0],
            1,
        )
    }

    #[test]
    fn parse_selector_splits_values() {
        let (axis, values) = parse_selector("prior=gaussian, laplace").unwrap();
        assert_eq!(axis, Axis::Prior);
        assert_eq!(values.len(), 2);
        assert!(values.contains(&AxisValue::Prior(Prior::Laplace)));
    }

    #[test]
    fn parse_selector_rejects_garbage() {
        assert!(matches!(
            parse_selector("prior"),
            Err(SweepError::InvalidSelector(_))
        ));
        assert!(matches!(
            parse_selector("lr=0.1"),
            Err(SweepError::UnknownAxis(_))
        ));
        assert!(matches!(
            parse_selector("prior=normalish"),
            Err(SweepError::UnknownPrior(_))
        ));
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let g = grid();
        assert_eq!(selected(&g, &Selection::new()).len(), g.len());
    }

    #[test]
    fn selection_intersects_axes() {
        let g = grid();
        let sel = build_selection(["prior=gaussian,laplace", "data=mnist"]).unwrap();
        let combos = selected(&g, &sel);
        assert_eq!(combos.len(), 2 * 1 * 2);
        assert!(combos
            .iter()
            .all(|c| c.prior != Prior::StudentT && c.dataset.as_str() == "mnist"));
    }

    #[test]
    fn repeated_axis_unions_values() {
        let sel = build_selection(["temp=0.1", "temp=1.0"]).unwrap();
        assert_eq!(sel[&Axis::Temperature].len(), 2);
    }

    #[test]
    fn axis_with_empty_set_selects_nothing() {
        let mut sel = Selection::new();
        sel.insert(Axis::Prior, BTreeSet::new());
        assert!(selected(&grid(), &sel).is_empty());
    }
}
