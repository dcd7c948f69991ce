//! The continuously re-armed frame callback of a live generation.

use crate::backend::RenderBackend;
use crate::error::SceneError;
use crate::generation::SceneGeneration;

/// Schedules the next frame, e.g. a window redraw request.
pub trait FrameScheduler {
    fn request_frame(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// The loop was stopped or its generation disposed; nothing was touched
    /// and no further frame was requested.
    Stopped,
}

/// Start/stop handle for one generation's frame loop.
///
/// Each tick advances the camera damping, spins every sphere by a fixed
/// increment, renders once and re-arms the scheduler. Stopping is
/// synchronous: a tick that was already queued finds the loop stopped and
/// returns without touching the generation.
#[derive(Debug)]
pub struct RenderLoop {
    running: bool,
    spin_per_frame: f32,
    frames: u64,
}

impl RenderLoop {
    pub fn new(spin_per_frame: f32) -> Self {
        Self {
            running: false,
            spin_per_frame,
            frames: 0,
        }
    }

    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &S) {
        if self.running {
            return;
        }
        self.running = true;
        scheduler.request_frame();
    }

    /// Stops the loop. Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn tick<B, S>(
        &mut self,
        generation: &mut SceneGeneration,
        backend: &mut B,
        scheduler: &S,
    ) -> Result<TickOutcome, SceneError>
    where
        B: RenderBackend + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        if !self.running || generation.is_disposed() {
            return Ok(TickOutcome::Stopped);
        }

        generation.controls.update(&mut generation.camera);
        generation.advance_spin(self.spin_per_frame);

        if let Err(err) = backend.render(generation) {
            self.running = false;
            return Err(err);
        }

        self.frames += 1;
        scheduler.request_frame();
        Ok(TickOutcome::Rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SceneSettings;
    use crate::testing::{build_generation, CountingScheduler, RecordingBackend};

    #[test]
    fn start_arms_exactly_once() {
        let scheduler = CountingScheduler::default();
        let mut frame_loop = RenderLoop::new(0.01);
        frame_loop.start(&scheduler);
        frame_loop.start(&scheduler);
        assert!(frame_loop.is_running());
        assert_eq!(scheduler.requests(), 1);
    }

    #[test]
    fn each_tick_spins_renders_and_rearms() {
        let settings = SceneSettings::default();
        let (mut generation, _tracker) = build_generation(&settings, 3);
        let mut backend = RecordingBackend::attached();
        let scheduler = CountingScheduler::default();

        let mut frame_loop = RenderLoop::new(settings.spin_per_frame);
        frame_loop.start(&scheduler);
        for _ in 0..5 {
            assert_eq!(
                frame_loop.tick(&mut generation, &mut backend, &scheduler).unwrap(),
                TickOutcome::Rendered
            );
        }

        assert_eq!(backend.renders, 5);
        assert_eq!(scheduler.requests(), 6);
        assert_eq!(frame_loop.frames_rendered(), 5);
        for sphere in &generation.spheres {
            assert!((sphere.rotation_y - 5.0 * settings.spin_per_frame).abs() < 1e-6);
        }
    }

    #[test]
    fn queued_tick_after_stop_is_inert() {
        let settings = SceneSettings::default();
        let (mut generation, _tracker) = build_generation(&settings, 2);
        let mut backend = RecordingBackend::attached();
        let scheduler = CountingScheduler::default();

        let mut frame_loop = RenderLoop::new(settings.spin_per_frame);
        frame_loop.start(&scheduler);
        assert!(frame_loop.stop());
        assert!(!frame_loop.stop());

        let outcome = frame_loop.tick(&mut generation, &mut backend, &scheduler).unwrap();
        assert_eq!(outcome, TickOutcome::Stopped);
        assert_eq!(backend.renders, 0);
        assert_eq!(scheduler.requests(), 1);
        assert!(generation.spheres.iter().all(|s| s.rotation_y == 0.0));
    }

    #[test]
    fn render_failure_stops_the_loop() {
        let settings = SceneSettings::default();
        let (mut generation, _tracker) = build_generation(&settings, 1);
        let mut backend = RecordingBackend {
            fail_render: true,
            ..RecordingBackend::attached()
        };
        let scheduler = CountingScheduler::default();

        let mut frame_loop = RenderLoop::new(settings.spin_per_frame);
        frame_loop.start(&scheduler);
        assert!(frame_loop.tick(&mut generation, &mut backend, &scheduler).is_err());
        assert!(!frame_loop.is_running());
        assert_eq!(scheduler.requests(), 1);
    }
}
