//! Wall-clock timing for wrapping calls from the outside.

use std::time::{Duration, Instant};

/// A value together with how long it took to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<T> {
    /// The result.
    pub value: T,
    /// Elapsed wall-clock time.
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    /// Apply `f` to the value, keeping the timing.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Timed<U> {
        Timed {
            value: f(self.value),
            elapsed: self.elapsed,
        }
    }
}

impl<T, E> Timed<Result<T, E>> {
    /// Move the timing inside a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error.
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed { value, elapsed })
    }
}

/// Run `f` and measure it.
///
/// ```
/// use conjoint::timing::timed;
///
/// let t = timed(|| (1..=10).sum::<u32>());
/// assert_eq!(t.value, 55);
/// ```
pub fn timed<T, F: FnOnce() -> T>(f: F) -> Timed<T> {
    let start = Instant::now();
    let value = f();
    Timed {
        value,
        elapsed: start.elapsed(),
    }
}
