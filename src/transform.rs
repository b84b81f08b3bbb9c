/// A 2D affine transformation stored as the top two rows of a 3x3 matrix.
///
/// `data` is `[a, b, tx, c, d, ty]`, mapping a point as
/// `(a*x + b*y + tx, c*x + d*y + ty)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub data: [f32; 6],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            data: [
                1.0, 0.0, x, // row 0
                0.0, 1.0, y, // row 1
            ],
        }
    }

    /// Rotation by `angle_radians`, clockwise in y-down screen space
    pub fn rotate(angle_radians: f32) -> Self {
        let cos = angle_radians.cos();
        let sin = angle_radians.sin();
        Self {
            data: [
                cos, -sin, 0.0, // row 0
                sin, cos, 0.0, // row 1
            ],
        }
    }

    pub fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            data: [
                sx, 0.0, 0.0, // row 0
                0.0, sy, 0.0, // row 1
            ],
        }
    }

    /// Apply `inner` about the pivot `(cx, cy)` instead of the origin.
    pub fn about(cx: f32, cy: f32, inner: &Transform) -> Self {
        Self::translate(cx, cy)
            .then(inner)
            .then(&Self::translate(-cx, -cy))
    }

    /// Matrix product `self * other`: the result maps through `other` before `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        let [a1, b1, tx1, c1, d1, ty1] = self.data;
        let [a2, b2, tx2, c2, d2, ty2] = other.data;

        Transform {
            data: [
                a1 * a2 + b1 * c2,
                a1 * b2 + b1 * d2,
                a1 * tx2 + b1 * ty2 + tx1,
                c1 * a2 + d1 * c2,
                c1 * b2 + d1 * d2,
                c1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, tx, c, d, ty] = self.data;
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
