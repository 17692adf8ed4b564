//! End-to-end engine tests over the mock platform seams.
//!
//! No OS interaction: process state, windows, and keystrokes are all
//! scripted. Timing paths run under a paused tokio clock so the fixed
//! delays elapse instantly.

use std::sync::Arc;

use config::{Config, CycleMethod, Mapping};
use switchkey_engine::{
    Outcome, Switcher,
    mocks::{MockProcs, MockSynth, MockWinOps},
    ops::{LaunchTarget, WindowInfo, WindowQuery},
};

const EDITOR: &str = "com.example.editor";

fn mapping(method: CycleMethod) -> Mapping {
    let mut cfg = Config::builtin_default();
    let mut m = cfg.mappings.remove(0);
    m.app_name = "Editor".into();
    m.bundle_id = EDITOR.into();
    m.window_behavior.cycle_method = method;
    m
}

fn win(pid: i32, id: u32, minimized: bool) -> WindowInfo {
    WindowInfo {
        pid,
        id,
        title: format!("doc-{id}"),
        minimized,
    }
}

struct Harness {
    procs: Arc<MockProcs>,
    win: Arc<MockWinOps>,
    synth: Arc<MockSynth>,
    switcher: Switcher,
}

fn harness() -> Harness {
    let procs = Arc::new(MockProcs::new());
    let win = Arc::new(MockWinOps::new());
    let synth = Arc::new(MockSynth::new());
    let switcher = Switcher::new(procs.clone(), win.clone(), synth.clone());
    Harness {
        procs,
        win,
        synth,
        switcher,
    }
}

#[tokio::test(start_paused = true)]
async fn not_running_launches_by_bundle_and_creates_no_cycler() {
    let h = harness();
    let m = mapping(CycleMethod::Next);

    let outcome = h.switcher.activate(&m).await;

    assert_eq!(outcome, Outcome::Launched);
    assert_eq!(h.procs.launched(), vec![LaunchTarget::Bundle(EDITOR.into())]);
    assert!(h.switcher.cyclers().is_empty());
    assert_eq!(h.synth.hides(), 0);
    assert_eq!(h.synth.new_windows(), 0);
}

#[tokio::test(start_paused = true)]
async fn custom_launch_path_overrides_bundle_lookup() {
    let h = harness();
    let mut m = mapping(CycleMethod::Next);
    m.custom_launch_path = Some("/Applications/Editor.app".into());

    assert_eq!(h.switcher.activate(&m).await, Outcome::Launched);
    assert_eq!(
        h.procs.launched(),
        vec![LaunchTarget::Path("/Applications/Editor.app".into())]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_custom_launch_path_falls_back_to_bundle() {
    let h = harness();
    let mut m = mapping(CycleMethod::Next);
    m.custom_launch_path = Some("".into());

    assert_eq!(h.switcher.activate(&m).await, Outcome::Launched);
    assert_eq!(h.procs.launched(), vec![LaunchTarget::Bundle(EDITOR.into())]);
}

#[tokio::test(start_paused = true)]
async fn launch_failure_is_swallowed() {
    let h = harness();
    h.procs.set_fail_launch(true);
    let m = mapping(CycleMethod::Next);

    // Still reports the launch outcome; no retry, no panic.
    assert_eq!(h.switcher.activate(&m).await, Outcome::Launched);
    assert_eq!(h.procs.launched().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn running_without_windows_activates_and_prompts_new_window() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    let m = mapping(CycleMethod::Next);

    let outcome = h.switcher.activate(&m).await;

    assert_eq!(outcome, Outcome::PromptedNewWindow);
    assert_eq!(h.procs.activated(), vec![42]);
    assert_eq!(h.synth.new_windows(), 1);
    assert!(h.switcher.cyclers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn only_minimized_windows_counts_as_windowless() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, true), win(42, 2, true)]);
    let m = mapping(CycleMethod::Next);

    assert_eq!(h.switcher.activate(&m).await, Outcome::PromptedNewWindow);
    assert!(h.switcher.cyclers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn minimize_method_synthesizes_one_hide_pair() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false)]);
    let m = mapping(CycleMethod::Minimize);

    let outcome = h.switcher.activate(&m).await;

    assert_eq!(outcome, Outcome::Minimized);
    assert_eq!(h.synth.hides(), 1);
    assert_eq!(h.synth.new_windows(), 0);
    assert!(h.switcher.cyclers().is_empty());
    assert!(h.win.raised().is_empty());
}

#[tokio::test(start_paused = true)]
async fn activate_method_brings_windows_forward_without_cycling() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false), win(42, 2, false)]);
    let m = mapping(CycleMethod::Activate);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Activated);
    assert_eq!(h.procs.activated(), vec![42]);
    assert!(h.switcher.cyclers().is_empty());
    assert!(h.win.raised().is_empty());
}

#[tokio::test(start_paused = true)]
async fn repeated_presses_advance_through_all_windows_and_wrap() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win
        .set_windows(vec![win(42, 10, false), win(42, 11, false), win(42, 12, false)]);
    let m = mapping(CycleMethod::Next);

    for _ in 0..4 {
        assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    }

    // 0 -> 1 -> 2 -> 0: every window visited once before repeating.
    assert_eq!(
        h.win.raised(),
        vec![(42, 10), (42, 11), (42, 12), (42, 10)]
    );
    assert_eq!(h.switcher.cyclers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stack_method_cycles_like_next() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false), win(42, 2, false)]);
    let m = mapping(CycleMethod::Stack);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert_eq!(h.win.raised(), vec![(42, 1), (42, 2)]);
}

#[tokio::test(start_paused = true)]
async fn minimized_windows_are_never_selected() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win
        .set_windows(vec![win(42, 1, false), win(42, 2, true), win(42, 3, false)]);
    let m = mapping(CycleMethod::Next);

    for _ in 0..4 {
        let _ = h.switcher.activate(&m).await;
    }
    assert!(h.win.raised().iter().all(|(_, id)| *id != 2));
}

#[tokio::test(start_paused = true)]
async fn cycler_empty_on_press_but_populated_on_retry_raises_first_window() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    // Window check in the controller and first cycler refresh both see a
    // window (so the cycle path engages), then the list empties, then the
    // retry finds one window.
    h.win.set_windows(vec![win(42, 5, false)]);
    h.win.push_query_result(WindowQuery::Full(vec![win(42, 5, false)]));
    h.win.push_query_result(WindowQuery::None);
    let m = mapping(CycleMethod::Next);

    // First press: controller sees a window, cycler's refresh sees none,
    // retry finds the steady-state window.
    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert_eq!(h.win.raised(), vec![(42, 5)]);
}

#[tokio::test(start_paused = true)]
async fn cycler_still_empty_after_retry_activates_as_terminal_fallback() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.push_query_result(WindowQuery::Full(vec![win(42, 5, false)]));
    h.win.set_query(WindowQuery::None);
    let m = mapping(CycleMethod::Next);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert!(h.win.raised().is_empty());
    // Activated for the cycle itself and again as the terminal fallback.
    assert_eq!(h.procs.activated(), vec![42, 42]);
}

#[tokio::test(start_paused = true)]
async fn raise_failure_falls_back_to_activation() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false)]);
    h.win.set_fail_raise(true);
    let m = mapping(CycleMethod::Next);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert!(h.win.raised().is_empty());
    // Pre-cycle activation plus the raise fallback.
    assert_eq!(h.procs.activated(), vec![42, 42]);
}

#[tokio::test(start_paused = true)]
async fn overlapping_presses_for_one_pid_serialize_cursor_advances() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false), win(42, 2, false)]);
    let m = mapping(CycleMethod::Next);

    // Both presses are in flight at once; the second blocks on the per-pid
    // cycler lock while the first sits in its settle delay, so the cursor
    // advances strictly sequentially instead of interleaving.
    let (a, b) = tokio::join!(h.switcher.activate(&m), h.switcher.activate(&m));

    assert_eq!(a, Outcome::Cycled);
    assert_eq!(b, Outcome::Cycled);
    assert_eq!(h.win.raised(), vec![(42, 1), (42, 2)]);
    assert_eq!(h.switcher.cyclers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cyclers_for_exited_processes_are_evicted() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false)]);
    let m = mapping(CycleMethod::Next);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert!(h.switcher.cyclers().contains(42));

    // Process exits; next activation launches and drops the stale cycler.
    h.procs.remove_running(42);
    assert_eq!(h.switcher.activate(&m).await, Outcome::Launched);
    assert!(!h.switcher.cyclers().contains(42));
}

#[tokio::test(start_paused = true)]
async fn relaunch_gets_a_fresh_cycler_under_the_new_pid() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.win.set_windows(vec![win(42, 1, false), win(42, 2, false)]);
    let m = mapping(CycleMethod::Next);
    let _ = h.switcher.activate(&m).await;

    h.procs.remove_running(42);
    h.procs.add_running(EDITOR, 77);
    h.win.set_windows(vec![win(77, 9, false)]);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Cycled);
    assert!(h.switcher.cyclers().contains(77));
    assert!(!h.switcher.cyclers().contains(42));
    assert_eq!(h.win.raised().last(), Some(&(77, 9)));
}

#[tokio::test(start_paused = true)]
async fn first_running_instance_is_the_target() {
    let h = harness();
    h.procs.add_running(EDITOR, 42);
    h.procs.add_running(EDITOR, 43);
    h.win.set_windows(vec![win(42, 1, false)]);
    let m = mapping(CycleMethod::Activate);

    assert_eq!(h.switcher.activate(&m).await, Outcome::Activated);
    assert_eq!(h.procs.activated(), vec![42]);
}
