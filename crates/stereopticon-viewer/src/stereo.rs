//! Stereo camera: per-eye viewports and matrices.
//!
//! The surface is split into left/right halves, side-by-side. Each eye gets a
//! perspective projection for its half and a view matrix combining pitch, a
//! per-eye mirrored yaw, and the interocular offset. The mirrored yaw (left
//! eye −yaw, right eye +yaw) reproduces the parallax behaviour of the
//! original headset viewer.

use stereopticon_engine::coords::{Mat4, Viewport};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    /// −1 for the left eye, +1 for the right.
    fn sign(self) -> f32 {
        match self {
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        }
    }
}

/// Pixel rectangle an eye renders into.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EyeViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything a renderer needs to draw one eye.
pub struct EyeView {
    pub viewport: EyeViewport,
    pub proj: Mat4,
    pub view: Mat4,
}

/// Stereo camera state.
///
/// Angles are in degrees to match how the sway animation and input nudges
/// express them; conversion to radians happens at matrix construction.
#[derive(Debug, Copy, Clone)]
pub struct StereoCamera {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Distance between the eyes in world units.
    pub eye_separation: f32,
    /// Camera pitch in degrees (arrow-key nudges).
    pub pitch_deg: f32,
    /// Yaw amplitude in degrees; mirrored per eye. Driven by the sway
    /// animation.
    pub yaw_deg: f32,
}

impl Default for StereoCamera {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            near: 0.1,
            far: 100.0,
            eye_separation: 0.35,
            pitch_deg: 0.0,
            yaw_deg: 0.0,
        }
    }
}

impl StereoCamera {
    /// Computes viewport and matrices for `eye` on a surface of `surface` size.
    pub fn eye_view(&self, eye: Eye, surface: Viewport) -> EyeView {
        let half_width = (surface.width / 2.0).max(1.0);
        let height = surface.height.max(1.0);

        let viewport = EyeViewport {
            x: match eye {
                Eye::Left => 0.0,
                Eye::Right => half_width,
            },
            y: 0.0,
            width: half_width,
            height,
        };

        let proj = Mat4::perspective(
            self.fov_y_deg.to_radians(),
            half_width / height,
            self.near,
            self.far,
        );

        // Camera transforms invert into the view matrix: an eye offset of
        // ±separation/2 becomes a translation of ∓separation/2.
        let yaw = (eye.sign() * self.yaw_deg).to_radians();
        let pitch = self.pitch_deg.to_radians();
        let view = Mat4::rotation_x(pitch)
            * Mat4::rotation_y(yaw)
            * Mat4::translation(-eye.sign() * self.eye_separation / 2.0, 0.0, 0.0);

        EyeView {
            viewport,
            proj,
            view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn surface() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    // ── viewport split ────────────────────────────────────────────────────

    #[test]
    fn eyes_cover_the_surface_in_halves() {
        let cam = StereoCamera::default();
        let left = cam.eye_view(Eye::Left, surface()).viewport;
        let right = cam.eye_view(Eye::Right, surface()).viewport;

        assert_eq!(left, EyeViewport { x: 0.0, y: 0.0, width: 640.0, height: 720.0 });
        assert_eq!(right, EyeViewport { x: 640.0, y: 0.0, width: 640.0, height: 720.0 });
    }

    #[test]
    fn degenerate_surface_keeps_viewports_positive() {
        let cam = StereoCamera::default();
        let v = cam.eye_view(Eye::Left, Viewport::new(0.0, 0.0)).viewport;
        assert!(v.width >= 1.0 && v.height >= 1.0);
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_uses_half_surface_aspect() {
        let cam = StereoCamera::default();
        let view = cam.eye_view(Eye::Left, surface());
        // A symmetric perspective for aspect a has m[0] = f/a, m[5] = f.
        let a = view.proj.m[5] / view.proj.m[0];
        assert!((a - 640.0 / 720.0).abs() < EPS, "aspect {a}");
    }

    #[test]
    fn matrices_are_finite() {
        let cam = StereoCamera {
            pitch_deg: 15.0,
            yaw_deg: -30.0,
            ..StereoCamera::default()
        };
        for eye in Eye::BOTH {
            let v = cam.eye_view(eye, surface());
            assert!(v.proj.is_finite() && v.view.is_finite());
        }
    }

    // ── mirrored yaw ──────────────────────────────────────────────────────

    #[test]
    fn yaw_is_mirrored_between_eyes() {
        let cam = StereoCamera {
            yaw_deg: 20.0,
            eye_separation: 0.0,
            ..StereoCamera::default()
        };

        let p = [0.0, 0.0, -10.0]; // quad center
        let l = cam.eye_view(Eye::Left, surface()).view.transform_point(p);
        let r = cam.eye_view(Eye::Right, surface()).view.transform_point(p);

        assert!((l[0] + r[0]).abs() < EPS, "left {l:?} right {r:?}");
        assert!((l[2] - r[2]).abs() < EPS);
    }

    #[test]
    fn zero_yaw_and_separation_give_identical_views() {
        let cam = StereoCamera {
            yaw_deg: 0.0,
            eye_separation: 0.0,
            ..StereoCamera::default()
        };
        let l = cam.eye_view(Eye::Left, surface()).view;
        let r = cam.eye_view(Eye::Right, surface()).view;
        assert_eq!(l, r);
    }

    #[test]
    fn eye_separation_offsets_views_in_opposite_directions() {
        let cam = StereoCamera {
            yaw_deg: 0.0,
            eye_separation: 0.4,
            ..StereoCamera::default()
        };

        let p = [0.0, 0.0, -10.0];
        let l = cam.eye_view(Eye::Left, surface()).view.transform_point(p);
        let r = cam.eye_view(Eye::Right, surface()).view.transform_point(p);

        // The left eye sits at −x, so the point shifts +x in its view.
        assert!((l[0] - 0.2).abs() < EPS, "left {l:?}");
        assert!((r[0] + 0.2).abs() < EPS, "right {r:?}");
    }
}
