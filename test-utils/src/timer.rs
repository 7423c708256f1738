use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// An ordered sequence of work that can be marked and measured between marks.
pub trait Timeline {
    type Mark;

    /// Marks the current tail of the timeline without blocking.
    fn mark(&self) -> Self::Mark;

    /// Moves an existing mark to the current tail.
    fn remark(&self, mark: &mut Self::Mark) {
        *mark = self.mark()
    }

    /// Blocks until the timeline has passed `mark`.
    fn wait(&self, mark: &Self::Mark);

    fn elapsed_ms(&self, start: &Self::Mark, end: &Self::Mark) -> f64;
}

/// The calling thread, measured with the monotonic clock.
#[derive(Clone, Copy, Default, Debug)]
pub struct HostTimeline;

impl Timeline for HostTimeline {
    type Mark = Instant;

    #[inline]
    fn mark(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn wait(&self, _: &Instant) {}

    #[inline]
    fn elapsed_ms(&self, start: &Instant, end: &Instant) -> f64 {
        end.saturating_duration_since(*start).as_secs_f64() * 1e3
    }
}

#[cfg(nvidia)]
impl<'ctx> Timeline for cuda::Stream<'ctx> {
    type Mark = cuda::Event<'ctx>;

    #[inline]
    fn mark(&self) -> Self::Mark {
        self.record()
    }

    #[inline]
    fn remark(&self, mark: &mut Self::Mark) {
        self.record_on(mark)
    }

    #[inline]
    fn wait(&self, mark: &Self::Mark) {
        mark.synchronize()
    }

    #[inline]
    fn elapsed_ms(&self, start: &Self::Mark, end: &Self::Mark) -> f64 {
        end.elapse_from(start).as_secs_f64() * 1e3
    }
}

/// Measures one interval at a time on a [`Timeline`].
///
/// `tic` and `record_end` only enqueue marks; `toc` waits for the end mark.
/// Marks are reused across intervals and released on drop.
pub struct Timer<'t, L: Timeline> {
    timeline: &'t L,
    start: Option<L::Mark>,
    end: Option<L::Mark>,
    ended: bool,
}

impl<'t, L: Timeline> Timer<'t, L> {
    pub fn new(timeline: &'t L) -> Self {
        Self {
            timeline,
            start: None,
            end: None,
            ended: false,
        }
    }

    pub fn tic(&mut self) {
        record(self.timeline, &mut self.start);
        self.ended = false
    }

    pub fn record_end(&mut self) {
        assert!(self.start.is_some(), "record_end called before tic");
        record(self.timeline, &mut self.end);
        self.ended = true
    }

    /// Milliseconds between the last `tic` and `record_end`, blocking until the end mark passes.
    pub fn toc(&self) -> f64 {
        let (Some(start), Some(end), true) = (&self.start, &self.end, self.ended) else {
            panic!("toc called without tic and record_end")
        };
        self.timeline.wait(end);
        self.timeline.elapsed_ms(start, end)
    }
}

fn record<L: Timeline>(timeline: &L, mark: &mut Option<L::Mark>) {
    match mark {
        Some(mark) => timeline.remark(mark),
        None => *mark = Some(timeline.mark()),
    }
}

/// Wall-clock time in seconds.
pub fn gettime() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{thread::sleep, time::Duration};

    #[test]
    fn test_host() {
        let host = HostTimeline;
        let mut timer = Timer::new(&host);
        for _ in 0..2 {
            timer.tic();
            sleep(Duration::from_millis(20));
            timer.record_end();
            let ms = timer.toc();
            assert!(ms >= 20., "{ms}");
        }
        // 不重新 record_end 时 toc 结果不变
        let a = timer.toc();
        assert_eq!(a, timer.toc());
    }

    #[test]
    #[should_panic(expected = "toc called without tic and record_end")]
    fn test_toc_without_end() {
        let host = HostTimeline;
        let mut timer = Timer::new(&host);
        timer.tic();
        timer.toc();
    }

    #[test]
    #[should_panic(expected = "record_end called before tic")]
    fn test_end_without_tic() {
        Timer::new(&HostTimeline).record_end()
    }

    #[test]
    fn test_gettime() {
        let a = gettime();
        sleep(Duration::from_millis(5));
        let b = gettime();
        assert!(a > 1e9 && b > a);
    }

    #[cfg(nvidia)]
    #[test]
    fn test_stream() {
        if let Err(cuda::NoDevice) = cuda::init() {
            return;
        }
        let Some(dev) = cuda::Device::fetch() else {
            return;
        };
        dev.context().apply(|ctx| {
            let stream = ctx.stream();
            let mut timer = Timer::new(&stream);
            for _ in 0..3 {
                timer.tic();
                let mem = stream.malloc::<f64>(1 << 20);
                drop(mem);
                timer.record_end();
                assert!(timer.toc() >= 0.);
            }
        });
    }
}
