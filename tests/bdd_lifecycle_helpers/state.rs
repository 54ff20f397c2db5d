//! Scenario state for lifecycle behavioural tests.

use podprobe::api::CommandOutcome;
use podprobe::scenario::RunReport;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::fake_engine::{FakeCli, FakeEngine};

/// What a harness run left behind for the `then` steps.
#[derive(Debug, Clone)]
pub(crate) struct Observed {
    /// Step report, absent when the session never opened.
    pub(crate) run: Option<RunReport>,
    /// Connection fault message when the scenario did not start.
    pub(crate) not_started: Option<String>,
    /// Number of cleanup faults collected.
    pub(crate) cleanup_faults: usize,
    /// Verdict mapped to the process exit contract.
    pub(crate) outcome: CommandOutcome,
}

#[derive(Default, ScenarioState)]
pub(crate) struct LifecycleState {
    pub(crate) engine: Slot<FakeEngine>,
    pub(crate) cli: Slot<FakeCli>,
    pub(crate) run_via_cli: Slot<bool>,
    pub(crate) continue_on_failure: Slot<bool>,
    pub(crate) unreachable: Slot<bool>,
    pub(crate) image_override: Slot<String>,
    pub(crate) earlier_run: Slot<Observed>,
    pub(crate) observed: Slot<Observed>,
}

#[fixture]
pub(crate) fn lifecycle_state() -> LifecycleState {
    let state = LifecycleState::default();
    let engine = FakeEngine::default();
    state.cli.set(FakeCli::new(engine.clone()));
    state.engine.set(engine);
    state.run_via_cli.set(false);
    state.continue_on_failure.set(false);
    state.unreachable.set(false);
    state
}
