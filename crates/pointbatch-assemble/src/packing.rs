//! Greedy largest-first packing of samples under a point budget.
//!
//! Samples are visited in descending point-count order (stable for ties).
//! The running group is closed whenever the next sample would push it
//! over the budget. A sample that exceeds the budget on its own still
//! forms a group of one.

use tracing::trace;

/// One packed sub-batch: indices into the input and their point total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedGroup {
    /// Input positions, in descending point-count order.
    pub indices: Vec<usize>,
    /// Sum of the point counts of `indices`, saturating at `usize::MAX`.
    pub points: usize,
}

/// Pack `counts` into groups whose totals stay within `max_points`.
///
/// Every input index appears in exactly one group. Groups are returned in
/// the order they were closed.
pub fn pack_by_point_budget(counts: &[usize], max_points: usize) -> Vec<PackedGroup> {
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    let mut groups = Vec::new();
    let mut current = PackedGroup::default();
    for index in order {
        let points = counts[index];
        if !current.indices.is_empty() && current.points.saturating_add(points) > max_points {
            trace!(samples = current.indices.len(), points = current.points, "group full");
            groups.push(std::mem::take(&mut current));
        }
        current.indices.push(index);
        current.points = current.points.saturating_add(points);
    }
    if !current.indices.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn totals(groups: &[PackedGroup]) -> Vec<usize> {
        groups.iter().map(|g| g.points).collect()
    }

    #[test]
    fn descending_counts_under_cap_six() {
        let groups = pack_by_point_budget(&[5, 4, 3, 2, 1], 6);
        assert_eq!(totals(&groups), [5, 4, 6]);
        assert_eq!(groups[2].indices, [2, 3, 4]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let groups = pack_by_point_budget(&[1, 3, 5, 2, 4], 6);
        assert_eq!(totals(&groups), [5, 4, 6]);
        assert_eq!(groups[0].indices, [2]);
        assert_eq!(groups[1].indices, [4]);
        assert_eq!(groups[2].indices, [1, 3, 0]);
    }

    #[test]
    fn ties_keep_input_order() {
        let groups = pack_by_point_budget(&[2, 2, 2], 4);
        assert_eq!(groups[0].indices, [0, 1]);
        assert_eq!(groups[1].indices, [2]);
    }

    #[test]
    fn oversized_sample_is_its_own_group() {
        let groups = pack_by_point_budget(&[10, 3, 2], 6);
        assert_eq!(totals(&groups), [10, 5]);
        assert_eq!(groups[0].indices, [0]);
    }

    #[test]
    fn everything_fits() {
        let groups = pack_by_point_budget(&[1, 2, 3], 100);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].indices, [2, 1, 0]);
    }

    #[test]
    fn huge_counts_saturate() {
        let groups = pack_by_point_budget(&[usize::MAX, usize::MAX], usize::MAX);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].points, usize::MAX);
    }

    #[test]
    fn empty_input_packs_nothing() {
        assert!(pack_by_point_budget(&[], 6).is_empty());
    }

    proptest! {
        #[test]
        fn packing_invariants(
            counts in prop::collection::vec(0usize..200, 0..64),
            cap in 1usize..400,
        ) {
            let groups = pack_by_point_budget(&counts, cap);

            let mut seen: Vec<usize> = groups
                .iter()
                .flat_map(|g| g.indices.iter().copied())
                .collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..counts.len()).collect::<Vec<_>>());

            let total: usize = groups.iter().map(|g| g.points).sum();
            prop_assert_eq!(total, counts.iter().sum::<usize>());

            for g in &groups {
                prop_assert!(!g.indices.is_empty());
                prop_assert_eq!(g.points, g.indices.iter().map(|&i| counts[i]).sum::<usize>());
                prop_assert!(g.points <= cap || g.indices.len() == 1);
            }
        }
    }
}
