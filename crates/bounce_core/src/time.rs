//! Fixed-timestep clock for the host loop.
//!
//! `begin_frame` feeds wall-clock time into an accumulator, `should_step`
//! drains it in `fixed_dt` slices (one `Game::update` per slice). The clock
//! also tracks the measured ticks per second and frames per second shown in
//! the debug text.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;
const RATE_WINDOW_SECS: f64 = 1.0;

pub const DEFAULT_TICK_RATE: u32 = 60;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,

    window_elapsed: f64,
    window_steps: u32,
    pub measured_tps: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE)
    }

    pub fn with_tick_rate(ticks_per_second: u32) -> Self {
        let fixed_dt = 1.0 / f64::from(ticks_per_second.max(1));
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / fixed_dt,
            smoothed_frame_time_ms: fixed_dt * 1000.0,
            window_elapsed: 0.0,
            window_steps: 0,
            measured_tps: 0.0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feeds an explicit frame delta. `begin_frame` calls this with the
    /// measured wall-clock delta.
    pub fn advance(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        self.window_elapsed += self.real_dt;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            self.window_steps += 1;
            true
        } else {
            false
        }
    }

    /// Closes the frame and rolls the tick-rate window once a second of
    /// wall time has been observed.
    pub fn end_frame(&mut self) {
        if self.window_elapsed >= RATE_WINDOW_SECS {
            self.measured_tps = f64::from(self.window_steps) / self.window_elapsed;
            self.window_elapsed = 0.0;
            self.window_steps = 0;
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(time: &mut TimeState, dt: f64) -> u32 {
        time.advance(dt);
        while time.should_step() {}
        time.end_frame();
        time.steps_this_frame
    }

    // 64 Hz keeps every delta exactly representable.
    #[test]
    fn steps_follow_accumulated_time() {
        let mut time = TimeState::with_tick_rate(64);
        assert_eq!(run_frame(&mut time, 1.0 / 128.0), 0);
        assert_eq!(run_frame(&mut time, 1.0 / 128.0), 1);
        assert_eq!(run_frame(&mut time, 2.0 / 64.0), 2);
        assert_eq!(time.fixed_step_count, 3);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut time = TimeState::with_tick_rate(64);
        let steps = run_frame(&mut time, 5.0);
        assert_eq!(time.real_dt, time.max_accumulator);
        assert_eq!(steps, 16);
    }

    #[test]
    fn tick_rate_is_measured_over_one_second() {
        let mut time = TimeState::with_tick_rate(64);
        assert_eq!(time.measured_tps, 0.0);
        for _ in 0..128 {
            run_frame(&mut time, 1.0 / 128.0);
        }
        assert_eq!(time.measured_tps, 64.0);
        assert_eq!(time.smoothed_fps, 128.0);
    }
}
