//! The claim / switch / onboarding flow controller.
//!
//! One controller instance drives one flow. The UI calls the methods here in
//! response to user input and renders from [`FlowSnapshot`]; every ordering
//! concern lives on this side of the seam:
//!
//! - search input is debounced and generation-counted, and a response is
//!   applied only while its query is still the current one;
//! - a claim cannot be submitted while one is in flight;
//! - a claim rejection returns to character selection with the service's
//!   message verbatim, and the candidate list is refreshed;
//! - the onboarding sync publishes simulated progress stages on a watch
//!   channel, with the terminal stage taken only from the real response.
//!
//! All state sits behind one async mutex and the lock is never held across
//! an API call, so a stale response can only be applied after re-checking
//! against current state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

use palisade_core::error::CoreError;
use palisade_core::flow::{
    ensure_selected, ClaimStep, OnboardingStep, SwitchStep, MIN_SEARCH_QUERY_LEN,
    SEARCH_DEBOUNCE_MS,
};
use palisade_core::professions::{ActiveSlot, ProfessionSlots};
use palisade_core::sync_progress::{SyncStage, DEFAULT_EXPECTED_SYNC};
use palisade_core::types::DbId;

use crate::api::{
    ApiError, CharacterCandidate, ClaimRequest, InviteCode, SettlementApi, Settlement, SyncMode,
};
use crate::progress::{self, SyncProgress};
use crate::store::{SelectionStore, SELECTED_SETTLEMENT_KEY};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Current step, tagged with which flow this controller is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Claim(ClaimStep),
    Switch(SwitchStep),
    Onboarding(OnboardingStep),
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Claim(s) => s.label(),
            Step::Switch(s) => s.label(),
            Step::Onboarding(s) => s.label(),
        }
    }

    pub fn is_failed(self) -> bool {
        matches!(
            self,
            Step::Claim(ClaimStep::Failed)
                | Step::Switch(SwitchStep::Failed)
                | Step::Onboarding(OnboardingStep::Failed)
        )
    }

    pub fn is_done(self) -> bool {
        matches!(
            self,
            Step::Claim(ClaimStep::Done)
                | Step::Switch(SwitchStep::Done)
                | Step::Onboarding(OnboardingStep::Done)
        )
    }

    fn can_transition(self, next: Step) -> bool {
        match (self, next) {
            (Step::Claim(a), Step::Claim(b)) => a.can_transition(b),
            (Step::Switch(a), Step::Switch(b)) => a.can_transition(b),
            (Step::Onboarding(a), Step::Onboarding(b)) => a.can_transition(b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Caller-facing errors from the controller.
///
/// These signal misuse (calling a method the current step does not allow),
/// not remote failures. Remote failures are absorbed into the flow state and
/// surfaced through the snapshot's `error_message`.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A claim is already in flight, or an operation cannot run mid-call.
    #[error("operation already in progress")]
    Busy,

    #[error("cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Which external call a `Failed` step can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailedOp {
    Claim,
    Sync,
    LoadCandidates,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct FlowState {
    step: Step,
    initial_step: Step,

    search_query: String,
    search_generation: u64,
    searching: bool,
    search_results: Vec<Settlement>,

    selected_settlement: Option<Settlement>,
    candidates: Vec<CharacterCandidate>,
    candidate_filter: String,
    current_character: Option<CharacterCandidate>,
    selected_character: Option<CharacterCandidate>,

    slots: ProfessionSlots,
    display_name: Option<String>,

    claim_in_flight: bool,
    error_message: Option<String>,
    last_failed: Option<FailedOp>,
    invite_code: Option<InviteCode>,
}

impl FlowState {
    fn new(step: Step) -> Self {
        Self {
            step,
            initial_step: step,
            search_query: String::new(),
            search_generation: 0,
            searching: false,
            search_results: Vec::new(),
            selected_settlement: None,
            candidates: Vec::new(),
            candidate_filter: String::new(),
            current_character: None,
            selected_character: None,
            slots: ProfessionSlots::default(),
            display_name: None,
            claim_in_flight: false,
            error_message: None,
            last_failed: None,
            invite_code: None,
        }
    }

    fn advance(&mut self, next: Step) -> Result<(), FlowError> {
        if !self.step.can_transition(next) {
            return Err(FlowError::InvalidTransition {
                from: self.step.label(),
                to: next.label(),
            });
        }
        self.step = next;
        Ok(())
    }
}

/// Render-ready view of the flow, cloned out from under the lock.
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    pub step: Step,
    pub step_label: &'static str,
    pub search_query: String,
    pub searching: bool,
    pub search_results: Vec<Settlement>,
    pub selected_settlement: Option<Settlement>,
    /// Candidates with the current filter applied.
    pub candidates: Vec<CharacterCandidate>,
    pub candidate_filter: String,
    pub current_character: Option<CharacterCandidate>,
    pub selected_character: Option<CharacterCandidate>,
    pub slots: ProfessionSlots,
    pub display_name: Option<String>,
    pub claim_in_flight: bool,
    pub error_message: Option<String>,
    pub invite_code: Option<InviteCode>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

struct Inner {
    api: Arc<dyn SettlementApi>,
    store: std::sync::OnceLock<Arc<dyn SelectionStore>>,
    state: Mutex<FlowState>,
    progress: Arc<watch::Sender<SyncProgress>>,
}

/// Handle to a running flow. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct FlowController {
    inner: Arc<Inner>,
}

impl FlowController {
    /// Flow for claiming a previously unclaimed character.
    pub fn claim(api: Arc<dyn SettlementApi>) -> Self {
        Self::new(api, Step::Claim(ClaimStep::SearchingSettlement))
    }

    /// Flow for switching to a different character in the same settlement.
    /// Call [`load_switch_candidates`](Self::load_switch_candidates) next.
    pub fn switch(api: Arc<dyn SettlementApi>) -> Self {
        Self::new(api, Step::Switch(SwitchStep::LoadingCandidates))
    }

    /// Flow for onboarding a settlement the service has never seen.
    pub fn onboarding(api: Arc<dyn SettlementApi>) -> Self {
        Self::new(api, Step::Onboarding(OnboardingStep::SearchingSettlement))
    }

    fn new(api: Arc<dyn SettlementApi>, step: Step) -> Self {
        let (tx, _) = watch::channel(SyncProgress::default());
        Self {
            inner: Arc::new(Inner {
                api,
                store: std::sync::OnceLock::new(),
                state: Mutex::new(FlowState::new(step)),
                progress: Arc::new(tx),
            }),
        }
    }

    /// Persist the settlement selection through `store` so a restarted UI
    /// can resume. Attach once, before driving the flow; later calls are
    /// ignored.
    pub fn with_store(self, store: Arc<dyn SelectionStore>) -> Self {
        let _ = self.inner.store.set(store);
        self
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        let st = self.inner.state.lock().await;
        FlowSnapshot {
            step: st.step,
            step_label: st.step.label(),
            search_query: st.search_query.clone(),
            searching: st.searching,
            search_results: st.search_results.clone(),
            selected_settlement: st.selected_settlement.clone(),
            candidates: st
                .candidates
                .iter()
                .filter(|c| matches_filter(c, &st.candidate_filter))
                .cloned()
                .collect(),
            candidate_filter: st.candidate_filter.clone(),
            current_character: st.current_character.clone(),
            selected_character: st.selected_character.clone(),
            slots: st.slots.clone(),
            display_name: st.display_name.clone(),
            claim_in_flight: st.claim_in_flight,
            error_message: st.error_message.clone(),
            invite_code: st.invite_code.clone(),
        }
    }

    /// Subscribe to sync progress updates. Meaningful while the onboarding
    /// flow is in its connecting step.
    pub fn progress(&self) -> watch::Receiver<SyncProgress> {
        self.inner.progress.subscribe()
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Record a keystroke of search input.
    ///
    /// Queries shorter than the minimum clear the results without calling
    /// out. Otherwise the call is debounced: this future sleeps, and only
    /// the latest generation proceeds to the API. A response is applied
    /// only if the query it answers is still the current one.
    pub async fn update_query(&self, input: &str) {
        let generation = {
            let mut st = self.inner.state.lock().await;
            st.search_generation += 1;
            st.search_query = input.trim().to_string();
            if st.search_query.chars().count() < MIN_SEARCH_QUERY_LEN {
                st.search_results.clear();
                st.searching = false;
                return;
            }
            st.searching = true;
            st.search_generation
        };

        tokio::time::sleep(Duration::from_millis(SEARCH_DEBOUNCE_MS)).await;

        let query = {
            let st = self.inner.state.lock().await;
            if st.search_generation != generation {
                // Superseded while debouncing.
                return;
            }
            st.search_query.clone()
        };

        let result = self.inner.api.search_settlements(&query).await;

        let mut st = self.inner.state.lock().await;
        if st.search_query != query {
            // The user kept typing; this answer is for an old question.
            tracing::debug!(%query, current = %st.search_query, "Discarding stale search response");
            return;
        }
        st.searching = false;
        match result {
            Ok(results) => {
                st.error_message = None;
                st.search_results = results;
            }
            Err(err) => {
                st.error_message = Some(err.user_message().to_string());
            }
        }
    }

    /// Pick a settlement from the current results.
    ///
    /// In the claim flow this also loads the settlement's unclaimed
    /// characters; in onboarding it moves to the confirmation step.
    pub async fn select_settlement(&self, settlement_id: DbId) -> Result<(), FlowError> {
        let (load_candidates, settlement) = {
            let mut st = self.inner.state.lock().await;
            let settlement = st
                .search_results
                .iter()
                .find(|s| s.id == settlement_id)
                .cloned()
                .ok_or(CoreError::NotFound {
                    entity: "settlement",
                    id: settlement_id,
                })?;

            let (next, load) = match st.step {
                Step::Claim(ClaimStep::SearchingSettlement) => {
                    (Step::Claim(ClaimStep::SelectingCharacter), true)
                }
                Step::Onboarding(OnboardingStep::SearchingSettlement) => {
                    (Step::Onboarding(OnboardingStep::ConfirmingSettlement), false)
                }
                other => {
                    return Err(FlowError::InvalidTransition {
                        from: other.label(),
                        to: "settlement selected",
                    })
                }
            };
            st.advance(next)?;
            st.selected_settlement = Some(settlement.clone());
            st.selected_character = None;
            st.candidates.clear();
            st.candidate_filter.clear();
            st.slots = ProfessionSlots::default();
            st.error_message = None;
            (load, settlement)
        };

        if let Some(store) = self.inner.store.get() {
            store.set(SELECTED_SETTLEMENT_KEY, &settlement.id.to_string());
        }

        if load_candidates {
            self.refresh_claimable_candidates(settlement.id).await;
        }
        Ok(())
    }

    /// Step back one screen where the flow allows it.
    pub async fn back(&self) -> Result<(), FlowError> {
        let mut st = self.inner.state.lock().await;
        let next = match st.step {
            Step::Claim(ClaimStep::SelectingCharacter) => {
                Step::Claim(ClaimStep::SearchingSettlement)
            }
            Step::Claim(ClaimStep::SelectingProfessions) => {
                Step::Claim(ClaimStep::SelectingCharacter)
            }
            Step::Onboarding(OnboardingStep::ConfirmingSettlement) => {
                Step::Onboarding(OnboardingStep::SearchingSettlement)
            }
            other => {
                return Err(FlowError::InvalidTransition {
                    from: other.label(),
                    to: "previous step",
                })
            }
        };
        st.advance(next)?;
        if matches!(next, Step::Claim(ClaimStep::SearchingSettlement))
            || matches!(next, Step::Onboarding(OnboardingStep::SearchingSettlement))
        {
            st.selected_settlement = None;
            st.candidates.clear();
        }
        if matches!(next, Step::Claim(ClaimStep::SelectingCharacter)) {
            st.selected_character = None;
            st.slots = ProfessionSlots::default();
        }
        st.error_message = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Load the switch flow's context: current character plus the other
    /// claimable characters in the same settlement.
    pub async fn load_switch_candidates(&self) -> Result<(), FlowError> {
        {
            let st = self.inner.state.lock().await;
            if st.step != Step::Switch(SwitchStep::LoadingCandidates) {
                return Err(FlowError::InvalidTransition {
                    from: st.step.label(),
                    to: SwitchStep::LoadingCandidates.label(),
                });
            }
        }

        let result = self.inner.api.fetch_switch_candidates().await;

        let mut st = self.inner.state.lock().await;
        match result {
            Ok(context) => {
                st.selected_settlement = Some(context.settlement);
                st.current_character = Some(context.current_character);
                st.candidates = context.available_characters;
                st.error_message = None;
                st.advance(Step::Switch(SwitchStep::SelectingCharacter))?;
            }
            Err(err) => {
                st.error_message = Some(err.user_message().to_string());
                st.last_failed = Some(FailedOp::LoadCandidates);
                st.advance(Step::Switch(SwitchStep::Failed))?;
            }
        }
        Ok(())
    }

    /// Narrow the candidate list. Matches name, profession labels, and
    /// total level, case-insensitively. An empty filter shows everything.
    pub async fn set_candidate_filter(&self, filter: &str) {
        let mut st = self.inner.state.lock().await;
        st.candidate_filter = filter.trim().to_string();
    }

    /// Pick a character from the candidate list. In the claim flow this
    /// advances to profession selection.
    pub async fn select_character(&self, character_id: DbId) -> Result<(), FlowError> {
        let mut st = self.inner.state.lock().await;
        let candidate = st
            .candidates
            .iter()
            .find(|c| c.id == character_id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: "character",
                id: character_id,
            })?;

        match st.step {
            Step::Claim(ClaimStep::SelectingCharacter) => {
                st.advance(Step::Claim(ClaimStep::SelectingProfessions))?;
            }
            Step::Switch(SwitchStep::SelectingCharacter) => {}
            other => {
                return Err(FlowError::InvalidTransition {
                    from: other.label(),
                    to: "character selected",
                })
            }
        }
        st.selected_character = Some(candidate);
        st.slots = ProfessionSlots::default();
        st.error_message = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Professions
    // -----------------------------------------------------------------------

    /// Toggle a profession label. Only labels drawn from the selected
    /// character's own skills are accepted.
    pub async fn toggle_profession(&self, label: &str) -> Result<(), FlowError> {
        let mut st = self.inner.state.lock().await;
        let character = ensure_selected(st.selected_character.as_ref(), "character")?;
        if !character.skills.contains_key(label) {
            return Err(CoreError::Validation(format!(
                "Profession '{label}' is not one of the character's skills"
            ))
            .into());
        }
        st.slots.toggle(label);
        Ok(())
    }

    /// Mark which slot the next toggle replaces when both are full.
    pub async fn focus_slot(&self, slot: ActiveSlot) {
        let mut st = self.inner.state.lock().await;
        st.slots.focus(slot);
    }

    pub async fn set_display_name(&self, name: &str) {
        let mut st = self.inner.state.lock().await;
        let trimmed = name.trim();
        st.display_name = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    // -----------------------------------------------------------------------
    // Claim
    // -----------------------------------------------------------------------

    /// Submit the claim. Rejected while another claim is in flight.
    ///
    /// On a service rejection the flow returns to character selection with
    /// the service's message verbatim and the candidate list refreshed; on
    /// a transport failure it enters `Failed` and can be retried.
    pub async fn commit_claim(&self) -> Result<(), FlowError> {
        let request = {
            let mut st = self.inner.state.lock().await;
            if st.claim_in_flight {
                return Err(FlowError::Busy);
            }
            let next = match st.step {
                Step::Claim(ClaimStep::SelectingProfessions) => Step::Claim(ClaimStep::Claiming),
                Step::Switch(SwitchStep::SelectingCharacter) => Step::Switch(SwitchStep::Claiming),
                other => {
                    return Err(FlowError::InvalidTransition {
                        from: other.label(),
                        to: "claiming",
                    })
                }
            };
            let request = build_claim_request(&st)?;
            st.advance(next)?;
            st.claim_in_flight = true;
            st.error_message = None;
            request
        };
        self.finish_claim(request).await;
        Ok(())
    }

    async fn finish_claim(&self, request: ClaimRequest) {
        let result = self.inner.api.commit_claim(&request).await;

        let refresh = {
            let mut st = self.inner.state.lock().await;
            st.claim_in_flight = false;
            match result {
                Ok(character) => {
                    tracing::info!(
                        character_id = character.id,
                        settlement_id = character.settlement_id,
                        "Claim committed"
                    );
                    let done = match st.step {
                        Step::Switch(_) => Step::Switch(SwitchStep::Done),
                        _ => Step::Claim(ClaimStep::Done),
                    };
                    let _ = st.advance(done);
                    // Ownership now lives with the service; the step is the
                    // only completion signal the controller keeps.
                    st.selected_settlement = None;
                    st.selected_character = None;
                    st.current_character = None;
                    st.candidates.clear();
                    st.candidate_filter.clear();
                    st.slots = ProfessionSlots::default();
                    st.display_name = None;
                    None
                }
                Err(ApiError::Rejected(message)) => {
                    // Someone else got there first. Back to the list, with
                    // the service's own words.
                    let back = match st.step {
                        Step::Switch(_) => Step::Switch(SwitchStep::SelectingCharacter),
                        _ => Step::Claim(ClaimStep::SelectingCharacter),
                    };
                    let _ = st.advance(back);
                    st.selected_character = None;
                    st.slots = ProfessionSlots::default();
                    st.error_message = Some(message);
                    st.selected_settlement.as_ref().map(|s| (s.id, st.step))
                }
                Err(err @ ApiError::Transport(_)) => {
                    let failed = match st.step {
                        Step::Switch(_) => Step::Switch(SwitchStep::Failed),
                        _ => Step::Claim(ClaimStep::Failed),
                    };
                    let _ = st.advance(failed);
                    st.last_failed = Some(FailedOp::Claim);
                    st.error_message = Some(err.user_message().to_string());
                    None
                }
            }
        };

        // After a rejection the listed candidates are provably out of date.
        if let Some((settlement_id, step)) = refresh {
            match step {
                Step::Switch(_) => {
                    let _ = self.refresh_switch_candidates().await;
                }
                _ => self.refresh_claimable_candidates(settlement_id).await,
            }
        }
    }

    async fn refresh_claimable_candidates(&self, settlement_id: DbId) {
        let result = self.inner.api.fetch_claimable_characters(settlement_id).await;
        let mut st = self.inner.state.lock().await;
        if st.selected_settlement.as_ref().map(|s| s.id) != Some(settlement_id) {
            return;
        }
        match result {
            Ok(candidates) => st.candidates = candidates,
            Err(err) => {
                tracing::warn!(settlement_id, error = %err, "Candidate refresh failed");
                st.error_message = Some(err.user_message().to_string());
            }
        }
    }

    async fn refresh_switch_candidates(&self) -> Result<(), ApiError> {
        let context = self.inner.api.fetch_switch_candidates().await?;
        let mut st = self.inner.state.lock().await;
        st.current_character = Some(context.current_character);
        st.candidates = context.available_characters;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------------

    /// Confirm the selected settlement and run the initial sync, then fetch
    /// the invite code and show it. Progress is published on the watch
    /// channel returned by [`progress`](Self::progress).
    pub async fn confirm_settlement(&self) -> Result<(), FlowError> {
        let settlement_id = {
            let mut st = self.inner.state.lock().await;
            if st.step != Step::Onboarding(OnboardingStep::ConfirmingSettlement) {
                return Err(FlowError::InvalidTransition {
                    from: st.step.label(),
                    to: OnboardingStep::ConnectingAndSyncing.label(),
                });
            }
            let settlement = ensure_selected(st.selected_settlement.as_ref(), "settlement")?;
            let id = settlement.id;
            st.advance(Step::Onboarding(OnboardingStep::ConnectingAndSyncing))?;
            st.error_message = None;
            id
        };
        self.run_sync(settlement_id).await
    }

    async fn run_sync(&self, settlement_id: DbId) -> Result<(), FlowError> {
        let cancel = CancellationToken::new();
        let simulator = tokio::spawn(progress::simulate(
            self.inner.progress.clone(),
            DEFAULT_EXPECTED_SYNC,
            cancel.clone(),
        ));

        let result = self
            .inner
            .api
            .sync_settlement(settlement_id, SyncMode::Full)
            .await;

        // Join the simulator before publishing the terminal stage so a late
        // tick cannot overwrite it.
        cancel.cancel();
        let _ = simulator.await;

        match result {
            Ok(report) => {
                self.inner
                    .progress
                    .send_replace(SyncStage::Completed.into());
                tracing::info!(
                    settlement_id,
                    members_found = report.members_found,
                    citizens_found = report.citizens_found,
                    duration_ms = report.duration_ms,
                    "Settlement sync completed"
                );
                let invite = self.inner.api.fetch_invite_code(settlement_id).await;
                let mut st = self.inner.state.lock().await;
                match invite {
                    Ok(code) => {
                        st.invite_code = Some(code);
                        st.advance(Step::Onboarding(OnboardingStep::ShowingInviteCode))?;
                    }
                    Err(err) => {
                        st.error_message = Some(err.user_message().to_string());
                        st.last_failed = Some(FailedOp::Sync);
                        st.advance(Step::Onboarding(OnboardingStep::Failed))?;
                    }
                }
            }
            Err(err) => {
                self.inner.progress.send_replace(SyncStage::Failed.into());
                tracing::warn!(settlement_id, error = %err, "Settlement sync failed");
                let mut st = self.inner.state.lock().await;
                st.error_message = Some(err.user_message().to_string());
                st.last_failed = Some(FailedOp::Sync);
                st.advance(Step::Onboarding(OnboardingStep::Failed))?;
            }
        }
        Ok(())
    }

    /// Acknowledge the invite code screen and finish onboarding.
    pub async fn finish(&self) -> Result<(), FlowError> {
        let mut st = self.inner.state.lock().await;
        st.advance(Step::Onboarding(OnboardingStep::Done))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Failure handling
    // -----------------------------------------------------------------------

    /// Re-run the external call that put the flow into `Failed`.
    pub async fn retry(&self) -> Result<(), FlowError> {
        let op = {
            let st = self.inner.state.lock().await;
            if !st.step.is_failed() {
                return Err(FlowError::InvalidTransition {
                    from: st.step.label(),
                    to: "retry",
                });
            }
            st.last_failed
                .ok_or_else(|| CoreError::Internal("failed step with no retryable call".into()))?
        };

        match op {
            FailedOp::Claim => {
                let request = {
                    let mut st = self.inner.state.lock().await;
                    if st.claim_in_flight {
                        return Err(FlowError::Busy);
                    }
                    let next = match st.step {
                        Step::Switch(_) => Step::Switch(SwitchStep::Claiming),
                        _ => Step::Claim(ClaimStep::Claiming),
                    };
                    let request = build_claim_request(&st)?;
                    st.advance(next)?;
                    st.claim_in_flight = true;
                    st.error_message = None;
                    request
                };
                self.finish_claim(request).await;
                Ok(())
            }
            FailedOp::Sync => {
                let settlement_id = {
                    let mut st = self.inner.state.lock().await;
                    let settlement =
                        ensure_selected(st.selected_settlement.as_ref(), "settlement")?;
                    let id = settlement.id;
                    st.advance(Step::Onboarding(OnboardingStep::ConnectingAndSyncing))?;
                    st.error_message = None;
                    id
                };
                self.run_sync(settlement_id).await
            }
            FailedOp::LoadCandidates => {
                {
                    let mut st = self.inner.state.lock().await;
                    st.advance(Step::Switch(SwitchStep::LoadingCandidates))?;
                    st.error_message = None;
                }
                self.load_switch_candidates().await
            }
        }
    }

    /// Abandon the flow: reset to its first step and clear every selection,
    /// including the persisted one. Rejected while a claim is in flight or
    /// a sync is running.
    pub async fn cancel(&self) -> Result<(), FlowError> {
        {
            let mut st = self.inner.state.lock().await;
            if st.claim_in_flight
                || st.step == Step::Onboarding(OnboardingStep::ConnectingAndSyncing)
            {
                return Err(FlowError::Busy);
            }
            *st = FlowState::new(st.initial_step);
        }
        if let Some(store) = self.inner.store.get() {
            store.clear(SELECTED_SETTLEMENT_KEY);
        }
        Ok(())
    }
}

fn build_claim_request(st: &FlowState) -> Result<ClaimRequest, FlowError> {
    let settlement = ensure_selected(st.selected_settlement.as_ref(), "settlement")?;
    let character = ensure_selected(st.selected_character.as_ref(), "character")?;
    Ok(ClaimRequest {
        character_id: character.id,
        settlement_id: settlement.id,
        display_name: st.display_name.clone(),
        primary_profession: st.slots.primary.clone(),
        secondary_profession: st.slots.secondary.clone(),
    })
}

fn matches_filter(candidate: &CharacterCandidate, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let needle = filter.to_lowercase();
    candidate.name.to_lowercase().contains(&needle)
        || candidate
            .top_profession
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(&needle))
        || candidate
            .skills
            .keys()
            .any(|label| label.to_lowercase().contains(&needle))
        || candidate.total_level.to_string() == needle
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
