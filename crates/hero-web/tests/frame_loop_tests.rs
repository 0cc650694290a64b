// Host-side tests for the animation loop bookkeeping.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod frame_loop {
    include!("../src/frame_loop.rs");
}

use frame_loop::LoopState;

#[test]
fn second_start_while_running_is_refused() {
    let mut state = LoopState::default();
    let id = state.start().unwrap();
    assert!(state.start().is_none());
    assert!(state.is_current(id));
}

#[test]
fn stopped_loop_callback_winds_down() {
    let mut state = LoopState::default();
    let id = state.start().unwrap();
    state.stop();
    assert!(!state.is_current(id));
}

#[test]
fn restart_retires_the_previous_callback() {
    let mut state = LoopState::default();
    let first = state.start().unwrap();
    state.stop();
    let second = state.start().unwrap();
    assert_ne!(first, second);
    assert!(!state.is_current(first));
    assert!(state.is_current(second));
}

#[test]
fn many_stop_start_cycles_leave_one_live_callback() {
    let mut state = LoopState::default();
    let ids: Vec<u32> = (0..50)
        .map(|_| {
            let id = state.start().unwrap();
            state.stop();
            id
        })
        .collect();
    let last = state.start().unwrap();
    assert!(ids.iter().all(|id| !state.is_current(*id)));
    assert!(state.is_current(last));
}
