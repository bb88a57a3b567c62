use core::ops::Mul;

/// Column-major 4×4 matrix.
///
/// Layout matches WGSL `mat4x4<f32>`, so values can be uploaded to uniform
/// buffers without transposition. Element `(row, col)` lives at
/// `m[col * 4 + row]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
        ],
    };

    /// Right-handed perspective projection mapping depth to wgpu's `[0, 1]`
    /// clip range (not WebGL's `[-1, 1]`).
    ///
    /// `fov_y` is the vertical field of view in radians; `aspect` is
    /// width/height of the target viewport.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        debug_assert!(fov_y > 0.0 && aspect > 0.0 && near > 0.0 && far > near);

        let f = 1.0 / (fov_y / 2.0).tan();
        let rr = 1.0 / (near - far);

        let mut m = [0.0; 16];
        m[0] = f / aspect;
        m[5] = f;
        m[10] = far * rr;
        m[11] = -1.0;
        m[14] = far * near * rr;
        Mat4 { m }
    }

    /// Rotation about the X axis (pitch), `angle` in radians.
    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[5] = c;
        r.m[6] = s;
        r.m[9] = -s;
        r.m[10] = c;
        r
    }

    /// Rotation about the Y axis (yaw), `angle` in radians.
    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[0] = c;
        r.m[2] = -s;
        r.m[8] = s;
        r.m[10] = c;
        r
    }

    /// Translation by `(x, y, z)`.
    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        let mut t = Mat4::IDENTITY;
        t.m[12] = x;
        t.m[13] = y;
        t.m[14] = z;
        t
    }

    /// Transforms a point (w = 1) and performs the perspective divide.
    ///
    /// CPU-side counterpart of what the vertex shader does on the GPU.
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let m = &self.m;
        let x = m[0] * p[0] + m[4] * p[1] + m[8] * p[2] + m[12];
        let y = m[1] * p[0] + m[5] * p[1] + m[9] * p[2] + m[13];
        let z = m[2] * p[0] + m[6] * p[1] + m[10] * p[2] + m[14];
        let w = m[3] * p[0] + m[7] * p[1] + m[11] * p[2] + m[15];
        if w.abs() > f32::EPSILON {
            [x / w, y / w, z / w]
        } else {
            [x, y, z]
        }
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    /// Raw column-major data, ready for uniform upload.
    #[inline]
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += a[k * 4 + row] * b[col * 4 + k];
                }
                out[col * 4 + row] = acc;
            }
        }
        Mat4 { m: out }
    }
}
