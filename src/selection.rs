//! The selection store: the one piece of state that survives across passes.
//!
//! The map surface replays its most recently activated feature on every
//! pass, so the store has to distinguish "the user clicked something new"
//! from "the map is repeating itself". Only the former may trigger a
//! rerender, or the pipeline would loop.

use crate::data::VillageAttrs;
use crate::filter::WorkingSubset;

/// The persisted "currently detailed village" state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Selected(VillageAttrs),
}

impl Selection {
    /// Selection key of the current record, if any.
    fn key(&self) -> Option<&str> {
        match self {
            Selection::Empty => None,
            Selection::Selected(attrs) => Some(attrs.key()),
        }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Selection is as before; views can render it directly.
    Unchanged,
    /// Selection changed to a new record; the controller must run one more
    /// pass before handing control back, so views see the updated state.
    NeedsRerender,
}

impl Transition {
    pub fn needs_rerender(self) -> bool { self == Transition::NeedsRerender }
}

/// Single-slot store for the current [`Selection`], owned by the dashboard
/// controller and reconciled exactly once per pass.
#[derive(Debug, Default)]
pub struct SelectionStore {
    current: Selection,
}

impl SelectionStore {
    pub fn new() -> Self { Self::default() }

    pub fn current(&self) -> &Selection { &self.current }

    /// The selected record, if any.
    pub fn selected(&self) -> Option<&VillageAttrs> {
        match &self.current {
            Selection::Empty => None,
            Selection::Selected(attrs) => Some(attrs),
        }
    }

    pub fn clear(&mut self) {
        self.current = Selection::Empty;
    }

    /// Reconcile the store against this pass's working subset and the map's
    /// click feedback. Rules, in order:
    ///
    /// 1. A selection whose key is no longer visible through `subset` is
    ///    cleared; an empty subset therefore always clears. No rerender:
    ///    clearing happens before any view reads the store in the same pass.
    /// 2. Feedback for a feature that is not visible is stale (the map is
    ///    replaying a click from a previous filter state) and is ignored.
    /// 3. Feedback with a key different from the current selection (or
    ///    arriving while empty) replaces the selection and signals a
    ///    rerender. Feedback with the same key is the map repeating the
    ///    active feature: state and signal are both left alone.
    ///
    /// Keys are village names; a feedback record without one carries the
    /// sentinel key, which compares unequal to every real name.
    pub fn reconcile(&mut self, subset: &WorkingSubset, feedback: Option<&VillageAttrs>) -> Transition {
        if let Some(key) = self.current.key() {
            if !subset.contains_key(key) {
                self.current = Selection::Empty;
            }
        }

        let Some(candidate) = feedback else {
            return Transition::Unchanged;
        };
        if !subset.contains_key(candidate.key()) {
            return Transition::Unchanged;
        }

        match self.current.key() {
            Some(key) if key == candidate.key() => Transition::Unchanged,
            _ => {
                self.current = Selection::Selected(candidate.clone());
                Transition::NeedsRerender
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::data::UNKNOWN_VILLAGE;

    use super::*;

    fn attrs(village: Option<&str>, commodity: &str) -> VillageAttrs {
        VillageAttrs {
            village: village.map(str::to_string),
            commodity: Some(commodity.to_string()),
            ..VillageAttrs::default()
        }
    }

    fn subset_of(keys: &[&str]) -> WorkingSubset {
        WorkingSubset::new(
            (0..keys.len()).collect(),
            keys.iter().map(|k| k.to_string()).collect::<HashSet<_>>(),
        )
    }

    #[test]
    fn starts_empty() {
        let store = SelectionStore::new();
        assert_eq!(store.current(), &Selection::Empty);
    }

    #[test]
    fn first_click_selects_and_signals() {
        let mut store = SelectionStore::new();
        let subset = subset_of(&["Desa1"]);
        let t = store.reconcile(&subset, Some(&attrs(Some("Desa1"), "KARET")));
        assert!(t.needs_rerender());
        assert_eq!(store.selected().unwrap().key(), "Desa1");
    }

    #[test]
    fn replayed_click_is_idempotent() {
        let mut store = SelectionStore::new();
        let subset = subset_of(&["Desa1"]);
        store.reconcile(&subset, Some(&attrs(Some("Desa1"), "KARET")));

        // Same key, different incidental field values: still the same selection.
        let replay = attrs(Some("Desa1"), "PADI");
        let t = store.reconcile(&subset, Some(&replay));
        assert!(!t.needs_rerender());
        assert_eq!(store.selected().unwrap().commodity.as_deref(), Some("KARET"));
    }

    #[test]
    fn new_key_replaces_selection_with_one_signal() {
        let mut store = SelectionStore::new();
        let subset = subset_of(&["Desa1", "Desa2"]);
        store.reconcile(&subset, Some(&attrs(Some("Desa1"), "KARET")));

        let t = store.reconcile(&subset, Some(&attrs(Some("Desa2"), "KOPI")));
        assert!(t.needs_rerender());
        assert_eq!(store.selected().unwrap().key(), "Desa2");

        // The follow-up pass replays the same feature: no second signal.
        let t = store.reconcile(&subset, Some(&attrs(Some("Desa2"), "KOPI")));
        assert!(!t.needs_rerender());
    }

    #[test]
    fn empty_subset_clears_unconditionally() {
        let mut store = SelectionStore::new();
        let subset = subset_of(&["Desa1"]);
        store.reconcile(&subset, Some(&attrs(Some("Desa1"), "KARET")));

        let t = store.reconcile(&WorkingSubset::default(), None);
        assert!(!t.needs_rerender());
        assert_eq!(store.current(), &Selection::Empty);
    }

    #[test]
    fn selection_outside_subset_is_cleared_without_a_click() {
        let mut store = SelectionStore::new();
        store.reconcile(&subset_of(&["Desa1"]), Some(&attrs(Some("Desa1"), "KARET")));

        // Filter switched to a different, non-empty district.
        let t = store.reconcile(&subset_of(&["Desa9"]), None);
        assert!(!t.needs_rerender());
        assert_eq!(store.current(), &Selection::Empty);
    }

    #[test]
    fn stale_feedback_for_hidden_feature_is_ignored() {
        let mut store = SelectionStore::new();
        let stale = attrs(Some("Desa1"), "KARET");
        let t = store.reconcile(&subset_of(&["Desa9"]), Some(&stale));
        assert!(!t.needs_rerender());
        assert_eq!(store.current(), &Selection::Empty);
    }

    #[test]
    fn nameless_feedback_uses_the_sentinel_key() {
        let mut store = SelectionStore::new();
        let subset = subset_of(&["Desa1", UNKNOWN_VILLAGE]);
        store.reconcile(&subset, Some(&attrs(Some("Desa1"), "KARET")));

        // A rendered feature without a name compares unequal to any real key.
        let t = store.reconcile(&subset, Some(&attrs(None, "KOPI")));
        assert!(t.needs_rerender());
        assert_eq!(store.selected().unwrap().key(), UNKNOWN_VILLAGE);
    }

    #[test]
    fn no_feedback_preserves_selection() {
        let mut store = SelectionStore::new();
        let subset = subset_of(&["Desa1"]);
        store.reconcile(&subset, Some(&attrs(Some("Desa1"), "KARET")));

        let t = store.reconcile(&subset, None);
        assert!(!t.needs_rerender());
        assert_eq!(store.selected().unwrap().key(), "Desa1");
    }
}
