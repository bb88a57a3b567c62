//! Viewer application: input handling, animation wiring, per-frame render.
//!
//! Controls:
//! - Right arrow / Enter / left click — next slide (with crossfade)
//! - Left arrow — previous slide (with crossfade)
//! - Space — toggle the idle camera sway
//! - Up / Down arrows — nudge camera pitch
//! - Escape — quit

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, trace};

use stereopticon_anim::{
    AbortController, Animation, AnimationHandle, Completion, FrameQueue, ScopedAnimation,
    ease_in_out_sine, linear, start, start_scoped,
};
use stereopticon_engine::core::{App, AppControl, FrameCtx};
use stereopticon_engine::coords::Viewport;
use stereopticon_engine::input::{Key, MouseButton};
use stereopticon_engine::render::Color;

use crate::deck::SlideDeck;
use crate::quad::SlideRenderer;
use crate::stereo::{Eye, StereoCamera};

/// Crossfade length on slide changes.
const FADE: Duration = Duration::from_millis(600);

/// Pitch change per arrow-key press, in degrees.
const PITCH_STEP_DEG: f32 = 2.0;
const PITCH_LIMIT_DEG: f32 = 45.0;

/// Viewer configuration derived from the command line.
pub struct ViewerConfig {
    /// One full sway leg (edge to edge), so a round trip takes twice this.
    pub sway_half_period: Duration,
    /// Sway amplitude in degrees.
    pub sway_amplitude_deg: f32,
    /// Interocular distance in world units.
    pub eye_separation: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sway_half_period: Duration::from_secs(4),
            sway_amplitude_deg: 30.0,
            eye_separation: 0.35,
        }
    }
}

pub struct ViewerApp {
    deck: SlideDeck,
    quad: SlideRenderer,
    camera: StereoCamera,

    frames: FrameQueue,

    sway_half_period: Duration,
    sway_amplitude_deg: f32,
    /// Some while sway is enabled.
    sway_ctrl: Option<AbortController>,
    /// Completion of the in-flight sway leg; polled to chain the next one.
    sway_done: Option<Completion>,
    /// Yaw the current leg is heading towards; the next leg starts there.
    sway_target_deg: f32,

    /// Yaw shared with the sway animation's update callback.
    yaw_deg: Rc<Cell<f32>>,
    /// Crossfade opacity shared with the fade animation's update callback.
    fade: Rc<Cell<f32>>,
    fade_handle: Option<AnimationHandle>,

    needs_upload: bool,
}

impl ViewerApp {
    pub fn new(deck: SlideDeck, config: ViewerConfig) -> Self {
        let camera = StereoCamera {
            eye_separation: config.eye_separation,
            ..StereoCamera::default()
        };

        Self {
            deck,
            quad: SlideRenderer::new(),
            camera,
            frames: FrameQueue::new(),
            sway_half_period: config.sway_half_period,
            sway_amplitude_deg: config.sway_amplitude_deg,
            sway_ctrl: None,
            sway_done: None,
            sway_target_deg: 0.0,
            yaw_deg: Rc::new(Cell::new(0.0)),
            fade: Rc::new(Cell::new(1.0)),
            fade_handle: None,
            needs_upload: true,
        }
    }

    fn handle_input(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let next = ctx.input_frame.key_pressed(Key::ArrowRight)
            || ctx.input_frame.key_pressed(Key::Enter)
            || ctx.input_frame.clicked(MouseButton::Left);
        let prev = ctx.input_frame.key_pressed(Key::ArrowLeft);

        if next {
            self.deck.next();
            self.begin_crossfade();
        } else if prev {
            self.deck.prev();
            self.begin_crossfade();
        }

        if ctx.input_frame.key_pressed(Key::Home) {
            self.deck.rewind();
            self.begin_crossfade();
        }

        if ctx.input_frame.key_pressed(Key::Space) {
            self.toggle_sway();
        }

        if ctx.input_frame.key_pressed(Key::ArrowUp) {
            self.camera.pitch_deg =
                (self.camera.pitch_deg + PITCH_STEP_DEG).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        }
        if ctx.input_frame.key_pressed(Key::ArrowDown) {
            self.camera.pitch_deg =
                (self.camera.pitch_deg - PITCH_STEP_DEG).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        }

        AppControl::Continue
    }

    /// Restarts the slide crossfade. A fade still in flight is cancelled; the
    /// new one takes over from fully transparent.
    fn begin_crossfade(&mut self) {
        if let Some(handle) = self.fade_handle.take() {
            handle.stop();
        }

        self.needs_upload = true;
        self.fade.set(0.0);

        let name = self.deck.current().name.clone();
        let fade = Rc::clone(&self.fade);
        let handle = start(
            &mut self.frames,
            Animation::new(linear, FADE)
                .on_update(move |p| fade.set(p))
                .on_end(move || trace!("crossfade to {name:?} finished")),
        );
        self.fade_handle = Some(handle);
    }

    fn toggle_sway(&mut self) {
        match self.sway_ctrl.take() {
            Some(ctrl) => {
                ctrl.abort();
                self.sway_done = None;
                debug!("sway off (yaw held at {:.1}°)", self.yaw_deg.get());
            }
            None => {
                self.sway_ctrl = Some(AbortController::new());
                self.sway_target_deg = self.sway_amplitude_deg;
                self.start_sway_leg(self.yaw_deg.get(), self.sway_target_deg);
                debug!("sway on");
            }
        }
    }

    /// Starts one sway leg from `from` to `to` degrees of yaw.
    fn start_sway_leg(&mut self, from: f32, to: f32) {
        let Some(ctrl) = self.sway_ctrl.as_ref() else { return };

        let yaw = Rc::clone(&self.yaw_deg);
        let done = start_scoped(
            &mut self.frames,
            ScopedAnimation::new(ease_in_out_sine, self.sway_half_period)
                .on_update(move |p| yaw.set(sway_mix(from, to, p)))
                .abort_on(ctrl.signal()),
        );
        self.sway_done = Some(done);
    }

    /// Chains the next sway leg once the in-flight one has completed.
    fn advance_sway(&mut self) {
        if self.sway_ctrl.is_none() {
            return;
        }
        let settled = self.sway_done.as_ref().is_some_and(Completion::is_settled);
        if !settled {
            return;
        }

        let from = self.sway_target_deg;
        self.sway_target_deg = -self.sway_target_deg;
        self.start_sway_leg(from, self.sway_target_deg);
    }
}

impl App for ViewerApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(ctx) == AppControl::Exit {
            return AppControl::Exit;
        }

        // Drive pending animation frames with the frame clock.
        self.frames.pump(ctx.time.elapsed);
        self.advance_sway();

        self.camera.yaw_deg = self.yaw_deg.get();

        let (width, height) = ctx.window.physical_size();
        let surface = Viewport::new(width as f32, height as f32);
        let eyes = Eye::BOTH.map(|eye| self.camera.eye_view(eye, surface));

        let tint = Color::new(1.0, 1.0, 1.0, self.fade.get());

        let deck = &self.deck;
        let quad = &mut self.quad;
        let needs_upload = std::mem::take(&mut self.needs_upload);

        ctx.render(Color::white(), |rctx, target| {
            if needs_upload {
                quad.set_slide(rctx, &deck.current().image);
            }
            quad.render(rctx, target, &eyes, tint);
        })
    }
}

/// Linear blend of a sway leg's endpoints at eased progress `p`.
fn sway_mix(from: f32, to: f32, p: f32) -> f32 {
    from + (to - from) * p
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sway leg blending ─────────────────────────────────────────────────

    #[test]
    fn sway_leg_spans_its_endpoints() {
        assert_eq!(sway_mix(-30.0, 30.0, 0.0), -30.0);
        assert_eq!(sway_mix(-30.0, 30.0, 1.0), 30.0);
        assert_eq!(sway_mix(-30.0, 30.0, 0.5), 0.0);
    }

    #[test]
    fn first_leg_starts_from_rest() {
        // Toggling sway on mid-scene must not snap the camera; the first leg
        // departs from wherever the yaw currently is.
        assert_eq!(sway_mix(0.0, 30.0, 0.0), 0.0);
    }

    // ── sway lifecycle against a pumped queue ─────────────────────────────

    #[test]
    fn sway_legs_alternate_direction() {
        let mut app = ViewerApp::new(SlideDeck::load(&[]).unwrap(), ViewerConfig {
            sway_half_period: Duration::from_secs(1),
            ..ViewerConfig::default()
        });

        app.toggle_sway();
        assert_eq!(app.sway_target_deg, 30.0);

        // Run the first leg to completion.
        app.frames.pump(0.0);
        app.frames.pump(1.0);
        app.advance_sway();
        assert_eq!(app.sway_target_deg, -30.0);
        assert!((app.yaw_deg.get() - 30.0).abs() < 1e-4);

        // Second leg heads back to the opposite edge.
        app.frames.pump(1.5);
        app.frames.pump(2.0);
        app.advance_sway();
        assert_eq!(app.sway_target_deg, 30.0);
        assert!((app.yaw_deg.get() + 30.0).abs() < 1e-4);
    }

    #[test]
    fn toggle_off_holds_yaw_in_place() {
        let mut app = ViewerApp::new(SlideDeck::load(&[]).unwrap(), ViewerConfig {
            sway_half_period: Duration::from_secs(1),
            ..ViewerConfig::default()
        });

        app.toggle_sway();
        app.frames.pump(0.0);
        app.frames.pump(0.5);
        let mid = app.yaw_deg.get();
        assert!(mid > 0.0 && mid < 30.0);

        app.toggle_sway();
        app.frames.pump(1.0);
        app.advance_sway();
        app.frames.pump(2.0);
        assert_eq!(app.yaw_deg.get(), mid);
        assert!(app.frames.is_idle());
    }

    #[test]
    fn retoggle_restarts_from_held_yaw() {
        let mut app = ViewerApp::new(SlideDeck::load(&[]).unwrap(), ViewerConfig {
            sway_half_period: Duration::from_secs(1),
            ..ViewerConfig::default()
        });

        app.toggle_sway();
        app.frames.pump(0.0);
        app.frames.pump(0.5);
        app.toggle_sway();
        app.frames.pump(1.0);
        let held = app.yaw_deg.get();

        // The restarted leg departs from the held yaw, not from zero.
        app.toggle_sway();
        app.frames.pump(1.0);
        assert!((app.yaw_deg.get() - held).abs() < 1e-4);
    }

    // ── crossfade ─────────────────────────────────────────────────────────

    #[test]
    fn crossfade_runs_transparent_to_opaque() {
        let mut app = ViewerApp::new(SlideDeck::load(&[]).unwrap(), ViewerConfig::default());

        app.begin_crossfade();
        assert_eq!(app.fade.get(), 0.0);

        app.frames.pump(0.0);
        app.frames.pump(0.3);
        assert!((app.fade.get() - 0.5).abs() < 1e-4);

        app.frames.pump(0.6);
        assert_eq!(app.fade.get(), 1.0);
        app.frames.pump(0.7);
        assert!(app.frames.is_idle());
    }

    #[test]
    fn new_crossfade_cancels_the_previous_one() {
        let mut app = ViewerApp::new(SlideDeck::load(&[]).unwrap(), ViewerConfig::default());

        app.begin_crossfade();
        app.frames.pump(0.0);
        app.frames.pump(0.3);

        app.begin_crossfade();
        assert_eq!(app.fade.get(), 0.0);

        // The stale run's pending frame must not touch the restarted fade.
        app.frames.pump(0.31);
        app.frames.pump(0.31 + 0.6);
        assert_eq!(app.fade.get(), 1.0);
        app.frames.pump(1.0);
        assert!(app.frames.is_idle());
    }
}
