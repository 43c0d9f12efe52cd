//! Profession slot selection state machine.
//!
//! A member advertises up to two professions (primary and secondary), drawn
//! from their own skill labels. The selection rules are small but easy to
//! get wrong in ad-hoc UI code, so they live here as an explicit state
//! machine with a tested invariant: primary and secondary never hold the
//! same label at the same time.

use serde::{Deserialize, Serialize};

/// Which slot a newly clicked label lands in when both slots are full.
///
/// Explicit state, mutated only by [`ProfessionSlots::focus`] and the
/// toggle rules below. Never inferred from incidental UI focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveSlot {
    Primary,
    Secondary,
}

/// The primary/secondary profession selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionSlots {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub active_slot: ActiveSlot,
}

impl Default for ProfessionSlots {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
            active_slot: ActiveSlot::Primary,
        }
    }
}

impl ProfessionSlots {
    /// Mark a slot as the active one. Subsequent toggles of fresh labels
    /// replace this slot when both slots are occupied.
    pub fn focus(&mut self, slot: ActiveSlot) {
        self.active_slot = slot;
    }

    /// Apply one label click.
    ///
    /// Rules, in order:
    /// - a label already held by a slot clears that slot;
    /// - otherwise the label fills the first open slot (primary first);
    /// - with both slots full, the label replaces the active slot.
    ///
    /// The primary != secondary invariant holds after every call because a
    /// label occupying the other slot is always cleared first.
    pub fn toggle(&mut self, label: &str) {
        if self.primary.as_deref() == Some(label) {
            self.primary = None;
            self.active_slot = ActiveSlot::Primary;
            return;
        }
        if self.secondary.as_deref() == Some(label) {
            self.secondary = None;
            self.active_slot = ActiveSlot::Secondary;
            return;
        }

        if self.primary.is_none() {
            self.primary = Some(label.to_string());
            self.active_slot = ActiveSlot::Secondary;
        } else if self.secondary.is_none() {
            self.secondary = Some(label.to_string());
            self.active_slot = ActiveSlot::Secondary;
        } else {
            match self.active_slot {
                ActiveSlot::Primary => self.primary = Some(label.to_string()),
                ActiveSlot::Secondary => self.secondary = Some(label.to_string()),
            }
        }
    }

    /// Invariant check: the two slots never hold the same label.
    pub fn is_consistent(&self) -> bool {
        match (&self.primary, &self.secondary) {
            (Some(p), Some(s)) => p != s,
            _ => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_click_fills_primary() {
        let mut slots = ProfessionSlots::default();
        slots.toggle("Forestry");
        assert_eq!(slots.primary.as_deref(), Some("Forestry"));
        assert_eq!(slots.secondary, None);
    }

    #[test]
    fn second_click_fills_secondary() {
        let mut slots = ProfessionSlots::default();
        slots.toggle("Forestry");
        slots.toggle("Mining");
        assert_eq!(slots.primary.as_deref(), Some("Forestry"));
        assert_eq!(slots.secondary.as_deref(), Some("Mining"));
    }

    #[test]
    fn clicking_assigned_label_clears_its_slot() {
        let mut slots = ProfessionSlots::default();
        slots.toggle("Forestry");
        slots.toggle("Mining");
        slots.toggle("Forestry");
        assert_eq!(slots.primary, None);
        assert_eq!(slots.secondary.as_deref(), Some("Mining"));
    }

    #[test]
    fn full_slots_replace_the_active_slot() {
        let mut slots = ProfessionSlots::default();
        slots.toggle("Forestry");
        slots.toggle("Mining");
        slots.focus(ActiveSlot::Primary);
        slots.toggle("Fishing");
        assert_eq!(slots.primary.as_deref(), Some("Fishing"));
        assert_eq!(slots.secondary.as_deref(), Some("Mining"));
    }

    #[test]
    fn full_slots_default_to_replacing_secondary() {
        // After filling both slots without an explicit focus(), the active
        // slot is the most recently written one (secondary).
        let mut slots = ProfessionSlots::default();
        slots.toggle("Forestry");
        slots.toggle("Mining");
        slots.toggle("Fishing");
        assert_eq!(slots.primary.as_deref(), Some("Forestry"));
        assert_eq!(slots.secondary.as_deref(), Some("Fishing"));
    }

    #[test]
    fn slots_never_hold_the_same_label() {
        // Exhaustive-ish click sequences over a small label set.
        let labels = ["A", "B", "C"];
        let focuses = [None, Some(ActiveSlot::Primary), Some(ActiveSlot::Secondary)];
        for &a in &labels {
            for &fa in &focuses {
                for &b in &labels {
                    for &fb in &focuses {
                        for &c in &labels {
                            let mut slots = ProfessionSlots::default();
                            if let Some(f) = fa {
                                slots.focus(f);
                            }
                            slots.toggle(a);
                            assert!(slots.is_consistent());
                            if let Some(f) = fb {
                                slots.focus(f);
                            }
                            slots.toggle(b);
                            assert!(slots.is_consistent());
                            slots.toggle(c);
                            assert!(slots.is_consistent(), "after {a},{b},{c}: {slots:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn reassigning_label_from_other_slot_clears_it_first() {
        let mut slots = ProfessionSlots::default();
        slots.toggle("Forestry");
        slots.toggle("Mining");
        // Clicking "Mining" clears secondary rather than duplicating it
        // into primary.
        slots.focus(ActiveSlot::Primary);
        slots.toggle("Mining");
        assert!(slots.is_consistent());
        assert_eq!(slots.secondary, None);
        assert_eq!(slots.primary.as_deref(), Some("Forestry"));
    }
}
