use std::time::Duration;

use tokio::time::Instant;

/// Elapsed-time clock that can be paused and repositioned.
///
/// Built on tokio's clock so it follows virtual time in paused-time tests.
#[derive(Debug, Default)]
pub(crate) struct Timer {
    start: Option<Instant>,
    pause_start: Option<Instant>,
    // Total time spent paused since `start`
    pause_time: Duration,
}

impl Timer {
    pub(crate) fn resume(&mut self) {
        match (self.start, self.pause_start) {
            (None, _) => {
                self.pause_start = None;
                self.pause_time = Duration::ZERO;
                self.start = Some(Instant::now());
            }
            (Some(_), Some(pause_start)) => {
                self.pause_time += pause_start.elapsed();
                self.pause_start = None;
            }
            (Some(_), None) => {}
        }
    }

    pub(crate) fn pause(&mut self) {
        if self.start.is_some() && self.pause_start.is_none() {
            self.pause_start = Some(Instant::now());
        }
    }

    pub(crate) fn stop(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn set_time(&mut self, position: Duration) {
        let now = Instant::now();
        // A position further back than the clock allows is pinned to the earliest instant
        self.start = Some(now.checked_sub(position).unwrap_or(now));
        self.pause_time = Duration::ZERO;
        if self.pause_start.is_some() {
            self.pause_start = Some(now);
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        let Some(start) = self.start else {
            return Duration::ZERO;
        };
        let current_pause_time = self
            .pause_start
            .map(|pause_start| pause_start.elapsed())
            .unwrap_or_default();
        start
            .elapsed()
            .saturating_sub(self.pause_time)
            .saturating_sub(current_pause_time)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::advance;

    use super::Timer;

    #[tokio::test(start_paused = true)]
    async fn excludes_paused_time() {
        let mut timer = Timer::default();
        timer.resume();
        advance(Duration::from_secs(2)).await;
        timer.pause();
        advance(Duration::from_secs(5)).await;
        assert_eq!(Duration::from_secs(2), timer.elapsed());

        timer.resume();
        advance(Duration::from_secs(1)).await;
        assert_eq!(Duration::from_secs(3), timer.elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn set_time_keeps_pause() {
        let mut timer = Timer::default();
        timer.resume();
        timer.pause();
        timer.set_time(Duration::from_secs(30));
        advance(Duration::from_secs(4)).await;
        assert_eq!(Duration::from_secs(30), timer.elapsed());

        timer.stop();
        assert_eq!(Duration::ZERO, timer.elapsed());
    }
}
