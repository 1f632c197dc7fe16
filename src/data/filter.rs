use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{SaleRecord, VehicleDataset};

// ---------------------------------------------------------------------------
// Selection: which option values are picked per filter dimension
// ---------------------------------------------------------------------------

/// The sidebar multiselects.
///
/// An empty set means "no constraint" for that dimension; non-empty sets
/// combine with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub years: BTreeSet<i32>,
    pub makes: BTreeSet<String>,
    pub states: BTreeSet<String>,
}

impl Selection {
    /// Whether no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.makes.is_empty() && self.states.is_empty()
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        self.years.clear();
        self.makes.clear();
        self.states.clear();
    }

    pub fn toggle_year(&mut self, year: i32) {
        toggle(&mut self.years, year);
    }

    pub fn toggle_make(&mut self, make: &str) {
        toggle(&mut self.makes, make.to_string());
    }

    pub fn toggle_state(&mut self, state: &str) {
        toggle(&mut self.states, state.to_string());
    }

    /// Forget picks that are no longer offered, e.g. after opening another file.
    pub fn retain_available(&mut self, dataset: &VehicleDataset) {
        self.years.retain(|y| dataset.years.contains(y));
        self.makes.retain(|m| dataset.makes.contains(m));
        self.states.retain(|s| dataset.states.contains(s));
    }

    /// Whether `rec` passes every active dimension.
    pub fn matches(&self, rec: &SaleRecord) -> bool {
        passes(&self.years, &rec.year)
            && passes(&self.makes, &rec.make)
            && passes(&self.states, &rec.state)
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn passes<T: Ord>(selected: &BTreeSet<T>, value: &T) -> bool {
    selected.is_empty() || selected.contains(value)
}

/// Return indices (ascending) of records that pass the selection.
pub fn filtered_indices(dataset: &VehicleDataset, selection: &Selection) -> Vec<usize> {
    if selection.is_empty() {
        return (0..dataset.len()).collect();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::LoadReport;
    use crate::data::model::tests::sale;

    fn dataset() -> VehicleDataset {
        VehicleDataset::from_records(
            vec![
                sale(2014, "Ford", "ca", 10000.0, 1),
                sale(2015, "Ford", "ca", 12000.0, 2),
                sale(2015, "Kia", "tx", 9000.0, 3),
                sale(2013, "BMW", "fl", 30000.0, 4),
                sale(2014, "Kia", "ca", 7000.0, 5),
            ],
            LoadReport::default(),
        )
    }

    #[test]
    fn make_filter_keeps_matching_rows() {
        let ds = dataset();
        let mut sel = Selection::default();
        sel.toggle_make("Ford");
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let ds = dataset();
        let mut sel = Selection::default();
        sel.toggle_year(2014);
        sel.toggle_year(2015);
        sel.toggle_state("ca");
        sel.toggle_make("Kia");
        assert_eq!(filtered_indices(&ds, &sel), vec![4]);
    }

    #[test]
    fn toggling_twice_removes_the_pick() {
        let mut sel = Selection::default();
        sel.toggle_state("ca");
        sel.toggle_state("ca");
        assert!(sel.is_empty());
    }

    #[test]
    fn unmatched_selection_yields_nothing() {
        let ds = dataset();
        let mut sel = Selection::default();
        sel.toggle_make("BMW");
        sel.toggle_state("tx");
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn retain_available_drops_stale_picks() {
        let ds = dataset();
        let mut sel = Selection::default();
        sel.toggle_make("Ford");
        sel.toggle_make("Tesla");
        sel.toggle_year(1999);
        sel.retain_available(&ds);
        assert_eq!(sel.makes.iter().collect::<Vec<_>>(), vec!["Ford"]);
        assert!(sel.years.is_empty());
    }

    fn arb_records() -> impl Strategy<Value = Vec<SaleRecord>> {
        let years = prop::sample::select(vec![2012, 2013, 2014, 2015]);
        let makes = prop::sample::select(vec!["Ford", "Kia", "BMW", "Nissan"]);
        let states = prop::sample::select(vec!["ca", "tx", "fl", "CA"]);
        prop::collection::vec(
            (years, makes, states, 1_000.0f64..50_000.0, 1u32..=28),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(y, m, s, p, d)| sale(y, m, s, p, d))
                .collect()
        })
    }

    fn arb_selection() -> impl Strategy<Value = Selection> {
        (
            prop::collection::btree_set(2012..=2016, 0..3),
            prop::collection::btree_set(
                prop::sample::select(vec!["Ford", "Kia", "BMW", "Audi"]).prop_map(String::from),
                0..3,
            ),
            prop::collection::btree_set(
                prop::sample::select(vec!["ca", "tx", "ny"]).prop_map(String::from),
                0..3,
            ),
        )
            .prop_map(|(years, makes, states)| Selection {
                years,
                makes,
                states,
            })
    }

    proptest! {
        #[test]
        fn filtered_rows_satisfy_every_active_selection(
            records in arb_records(),
            sel in arb_selection(),
        ) {
            let ds = VehicleDataset::from_records(records, LoadReport::default());
            let kept = filtered_indices(&ds, &sel);
            for &i in &kept {
                let rec = &ds.records[i];
                prop_assert!(sel.years.is_empty() || sel.years.contains(&rec.year));
                prop_assert!(sel.makes.is_empty() || sel.makes.contains(&rec.make));
                prop_assert!(sel.states.is_empty() || sel.states.contains(&rec.state));
            }
            // Nothing that passes is left out.
            let expected = ds.records.iter().filter(|r| sel.matches(r)).count();
            prop_assert_eq!(kept.len(), expected);
            prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn empty_selection_is_identity(records in arb_records()) {
            let ds = VehicleDataset::from_records(records, LoadReport::default());
            let kept = filtered_indices(&ds, &Selection::default());
            prop_assert_eq!(kept, (0..ds.len()).collect::<Vec<_>>());
        }
    }
}
