use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::ClockConfig;
use crate::time_source::{SystemClock, TimeSource};
use crate::timer::state::ChronoState;
use crate::ui::render::compose_frame;

pub struct FrameStats {
    total_frames: u64,
    dropped_frames: u64,
    target_frame: Duration,
    window_size: usize,
    window: VecDeque<Duration>,
}

impl FrameStats {
    pub fn new(window_size: usize, target_frame: Duration) -> Self {
        Self {
            total_frames: 0,
            dropped_frames: 0,
            target_frame,
            window_size: window_size.max(1),
            window: VecDeque::with_capacity(window_size.max(1)),
        }
    }

    pub fn record_frame(&mut self, frame_time: Duration) {
        self.total_frames += 1;
        // A frame counts as dropped once it overruns its slot by more than 10%.
        if frame_time > self.target_frame + self.target_frame / 10 {
            self.dropped_frames += 1;
        }

        if self.window.len() == self.window_size {
            let _ = self.window.pop_front();
        }
        self.window.push_back(frame_time);
    }

    pub fn rolling_fps(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let total_secs: f64 = self.window.iter().map(Duration::as_secs_f64).sum();
        if total_secs == 0.0 {
            return 0.0;
        }
        self.window.len() as f64 / total_secs
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

/// Fixed-rate pacing for the frame loop.
pub struct FramePacer {
    step: Duration,
    next_tick: Instant,
}

impl FramePacer {
    pub fn new(fps: u16) -> Self {
        let step = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        Self {
            step,
            next_tick: Instant::now() + step,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Sleeps until the current tick is due, then schedules the next one.
    /// Ticks missed while blocked (e.g. behind a modal menu) are skipped.
    pub fn wait(&mut self) {
        sleep_until(self.next_tick);
        let wake = Instant::now();
        while self.next_tick <= wake {
            self.next_tick += self.step;
        }
    }

    pub fn until_next_tick(&self) -> Duration {
        self.next_tick.saturating_duration_since(Instant::now())
    }
}

pub fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if now >= deadline {
        return;
    }

    let mut remaining = deadline.saturating_duration_since(now);
    if remaining > Duration::from_millis(1) {
        std::thread::sleep(remaining - Duration::from_micros(250));
    }

    loop {
        let current = Instant::now();
        if current >= deadline {
            break;
        }
        remaining = deadline.saturating_duration_since(current);
        if remaining > Duration::from_micros(50) {
            std::thread::yield_now();
        } else {
            std::hint::spin_loop();
        }
    }
}

pub struct DiagnosticsReport<'a> {
    pub config_path: &'a Path,
    pub config_source: &'static str,
    pub config: &'a ClockConfig,
    pub font_path: &'a Path,
    pub font_bytes: usize,
    pub fps: u16,
}

/// Headless self-check: prints what the widget would start with and runs a
/// short pacing benchmark of frame composition.
pub fn run_diagnostics(report: &DiagnosticsReport<'_>) {
    println!("CClock diagnostics");
    println!(
        "Config file: {} ({})",
        report.config_path.display(),
        report.config_source
    );
    for line in report.config.to_text().lines() {
        println!("  {line}");
    }
    println!(
        "Font: {} ({} bytes)",
        report.font_path.display(),
        report.font_bytes
    );
    println!("Target FPS: {}", report.fps);

    let clock = SystemClock;
    let state = ChronoState::new();
    let frame = compose_frame(state.readout(clock.now()));
    println!("Window title: {}", frame.title);
    println!("Date line: {}", frame.date);

    println!("Running 1 second pacing benchmark...");
    let mut pacer = FramePacer::new(report.fps);
    let mut stats = FrameStats::new(256, pacer.step());
    let bench_end = Instant::now() + Duration::from_secs(1);
    let mut frame_start = Instant::now();
    while Instant::now() < bench_end {
        let _ = compose_frame(state.readout(clock.now()));
        pacer.wait();
        let frame_end = Instant::now();
        stats.record_frame(frame_end.saturating_duration_since(frame_start));
        frame_start = frame_end;
    }

    println!("Benchmark summary:");
    println!("  Frames: {}", stats.total_frames());
    println!("  Dropped: {}", stats.dropped_frames());
    println!("  Rolling FPS: {:.1}", stats.rolling_fps());
}
