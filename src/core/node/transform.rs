//=========================================================================
// Transform
//=========================================================================
//
// Per-node 2D affine state: position, rotation (radians) and
// non-uniform scale.
//
// Local matrix = translate(position) * rotate(rotation) * scale(sx, sy)
//
// The composed (root-to-node) matrix is cached by the NodeTree, which is
// the only place a transform can be mutated from once a node is created.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::{Affine, Point, Vec2};

//=== Transform ===========================================================

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point,
    pub rotation: f64,
    pub scale: Vec2,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Point::ZERO,
        rotation: 0.0,
        scale: Vec2::new(1.0, 1.0),
    };

    pub fn from_position(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    pub fn with_uniform_scale(self, s: f64) -> Self {
        self.with_scale(s, s)
    }

    /// Builds the local matrix.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// True when either scale axis collapses to zero.
    pub fn is_degenerate(&self) -> bool {
        self.scale.x == 0.0 || self.scale.y == 0.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn identity_maps_points_to_themselves() {
        let p = Transform::IDENTITY.to_affine() * Point::new(3.0, -4.0);
        assert_eq!(p, Point::new(3.0, -4.0));
    }

    #[test]
    fn scale_applies_before_translation() {
        let t = Transform::from_position(100.0, 100.0).with_uniform_scale(2.0);
        let p = t.to_affine() * Point::new(1.0, 1.0);
        assert_abs_diff_eq!(p.x, 102.0, epsilon = EPSILON);
        assert_abs_diff_eq!(p.y, 102.0, epsilon = EPSILON);
    }

    #[test]
    fn rotation_is_counter_clockwise_in_radians() {
        let t = Transform::IDENTITY.with_rotation(FRAC_PI_2);
        let p = t.to_affine() * Point::new(1.0, 0.0);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn non_uniform_scale() {
        let t = Transform::IDENTITY.with_scale(2.0, 3.0);
        let p = t.to_affine() * Point::new(1.0, 1.0);
        assert_abs_diff_eq!(p.x, 2.0, epsilon = EPSILON);
        assert_abs_diff_eq!(p.y, 3.0, epsilon = EPSILON);
        assert!(!t.is_degenerate());
        assert!(t.with_scale(0.0, 1.0).is_degenerate());
    }
}
