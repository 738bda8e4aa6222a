use std::time::{Duration, Instant};

/// Runs `f` and returns its result along with the wall-clock time it took.
pub fn time<A>(f: impl FnOnce() -> A) -> (A, Duration) {
    let start = Instant::now();
    let r = f();
    (r, start.elapsed())
}
