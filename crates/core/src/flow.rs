//! Step definitions and transition rules for the claim, switch, and
//! onboarding flows.
//!
//! Three user-facing flows share one shape: a linear sequence of steps, a
//! terminal `Done`, and a `Failed` state reachable from the steps that
//! perform external calls. The controller in `palisade-client` drives the
//! async work; the legality of each transition is decided here so it can be
//! tested without any I/O.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Claim flow ("claim a new character")
// ---------------------------------------------------------------------------

/// Steps for claiming a previously unclaimed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStep {
    SearchingSettlement,
    SelectingCharacter,
    SelectingProfessions,
    Claiming,
    Done,
    Failed,
}

impl ClaimStep {
    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::SearchingSettlement => "Find your settlement",
            Self::SelectingCharacter => "Pick your character",
            Self::SelectingProfessions => "Choose your professions",
            Self::Claiming => "Claiming…",
            Self::Done => "Done",
            Self::Failed => "Something went wrong",
        }
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Forward motion is strictly linear. Backward motion is allowed one
    /// step at a time for the selection steps. `Claiming` may fall back to
    /// `SelectingCharacter` when the store rejects the claim, and `Failed`
    /// may only re-enter `Claiming` (retry).
    pub fn can_transition(self, next: ClaimStep) -> bool {
        use ClaimStep::*;
        matches!(
            (self, next),
            (SearchingSettlement, SelectingCharacter)
                | (SelectingCharacter, SelectingProfessions)
                | (SelectingCharacter, SearchingSettlement)
                | (SelectingProfessions, Claiming)
                | (SelectingProfessions, SelectingCharacter)
                | (Claiming, Done)
                | (Claiming, SelectingCharacter)
                | (Claiming, Failed)
                | (Failed, Claiming)
        )
    }
}

// ---------------------------------------------------------------------------
// Switch flow ("switch to a different character")
// ---------------------------------------------------------------------------

/// Steps for switching an account to a different character in the same
/// settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchStep {
    LoadingCandidates,
    SelectingCharacter,
    Claiming,
    Done,
    Failed,
}

impl SwitchStep {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadingCandidates => "Loading characters…",
            Self::SelectingCharacter => "Pick your character",
            Self::Claiming => "Switching…",
            Self::Done => "Done",
            Self::Failed => "Something went wrong",
        }
    }

    pub fn can_transition(self, next: SwitchStep) -> bool {
        use SwitchStep::*;
        matches!(
            (self, next),
            (LoadingCandidates, SelectingCharacter)
                | (LoadingCandidates, Failed)
                | (SelectingCharacter, Claiming)
                | (Claiming, Done)
                | (Claiming, SelectingCharacter)
                | (Claiming, Failed)
                | (Failed, Claiming)
                | (Failed, LoadingCandidates)
        )
    }
}

// ---------------------------------------------------------------------------
// Onboarding flow ("connect a brand-new settlement")
// ---------------------------------------------------------------------------

/// Steps for onboarding a settlement that the service has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    SearchingSettlement,
    ConfirmingSettlement,
    ConnectingAndSyncing,
    ShowingInviteCode,
    Done,
    Failed,
}

impl OnboardingStep {
    pub fn label(self) -> &'static str {
        match self {
            Self::SearchingSettlement => "Find your settlement",
            Self::ConfirmingSettlement => "Confirm your settlement",
            Self::ConnectingAndSyncing => "Connecting…",
            Self::ShowingInviteCode => "Share your invite code",
            Self::Done => "Done",
            Self::Failed => "Something went wrong",
        }
    }

    pub fn can_transition(self, next: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, next),
            (SearchingSettlement, ConfirmingSettlement)
                | (ConfirmingSettlement, SearchingSettlement)
                | (ConfirmingSettlement, ConnectingAndSyncing)
                | (ConnectingAndSyncing, ShowingInviteCode)
                | (ConnectingAndSyncing, Failed)
                | (ShowingInviteCode, Done)
                | (Failed, ConnectingAndSyncing)
        )
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Require a selection to be present before an external call is issued.
///
/// Defensive check at the controller level, independent of whatever the UI
/// disables.
pub fn ensure_selected<'a, T>(value: Option<&'a T>, what: &str) -> Result<&'a T, CoreError> {
    value.ok_or_else(|| CoreError::Validation(format!("No {what} selected")))
}

/// Minimum query length before a settlement search is issued. Anything
/// shorter clears results instead of calling out.
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Debounce delay applied to search input before a call is issued.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_happy_path_is_legal() {
        use ClaimStep::*;
        let path = [
            SearchingSettlement,
            SelectingCharacter,
            SelectingProfessions,
            Claiming,
            Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition(pair[1]), "{pair:?}");
        }
    }

    #[test]
    fn claim_rejection_returns_to_character_selection() {
        assert!(ClaimStep::Claiming.can_transition(ClaimStep::SelectingCharacter));
    }

    #[test]
    fn claim_cannot_skip_ahead() {
        assert!(!ClaimStep::SearchingSettlement.can_transition(ClaimStep::Claiming));
        assert!(!ClaimStep::SearchingSettlement.can_transition(ClaimStep::SelectingProfessions));
        assert!(!ClaimStep::SelectingCharacter.can_transition(ClaimStep::Done));
    }

    #[test]
    fn claim_failed_only_retries_into_claiming() {
        use ClaimStep::*;
        assert!(Failed.can_transition(Claiming));
        for next in [SearchingSettlement, SelectingCharacter, SelectingProfessions, Done] {
            assert!(!Failed.can_transition(next), "{next:?}");
        }
    }

    #[test]
    fn done_is_terminal() {
        use ClaimStep::*;
        for next in [
            SearchingSettlement,
            SelectingCharacter,
            SelectingProfessions,
            Claiming,
            Done,
            Failed,
        ] {
            assert!(!Done.can_transition(next));
        }
    }

    #[test]
    fn switch_happy_path_is_legal() {
        use SwitchStep::*;
        let path = [LoadingCandidates, SelectingCharacter, Claiming, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition(pair[1]), "{pair:?}");
        }
    }

    #[test]
    fn onboarding_happy_path_is_legal() {
        use OnboardingStep::*;
        let path = [
            SearchingSettlement,
            ConfirmingSettlement,
            ConnectingAndSyncing,
            ShowingInviteCode,
            Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition(pair[1]), "{pair:?}");
        }
    }

    #[test]
    fn onboarding_sync_failure_retries_sync_not_search() {
        use OnboardingStep::*;
        assert!(ConnectingAndSyncing.can_transition(Failed));
        assert!(Failed.can_transition(ConnectingAndSyncing));
        assert!(!Failed.can_transition(SearchingSettlement));
    }

    #[test]
    fn ensure_selected_rejects_none() {
        let missing: Option<&i32> = None;
        let err = ensure_selected(missing, "character").unwrap_err();
        assert!(err.to_string().contains("No character selected"));
    }

    #[test]
    fn ensure_selected_passes_through() {
        let value = 7;
        assert_eq!(*ensure_selected(Some(&value), "character").unwrap(), 7);
    }

    #[test]
    fn labels_are_nonempty() {
        use ClaimStep::*;
        for step in [
            SearchingSettlement,
            SelectingCharacter,
            SelectingProfessions,
            Claiming,
            Done,
            Failed,
        ] {
            assert!(!step.label().is_empty());
        }
    }
}
