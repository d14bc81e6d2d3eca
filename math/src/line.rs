use cgmath::prelude::*;
use cgmath::{BaseFloat, Point2, Rad, Vector2};
use num_traits::NumCast;

pub type Line2d = Line2<f64>;

/// A directed segment stored as an origin, a unit direction and a length.
///
/// Zero-length segments keep a zero `displace` and are reported through
/// `is_degenerate`; they have no direction, so turns involving them are
/// undefined.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line2<T: BaseFloat> {
    pub origin: Point2<T>,
    pub displace: Vector2<T>,
    pub length: T,
}

impl<T: BaseFloat> Line2<T> {
    pub fn from_origin_and_displace(origin: Point2<T>, displace: Vector2<T>) -> Line2<T> {
        let length = displace.magnitude();
        if length.abs() >= min_length() {
            Line2 {
                origin,
                displace: displace / length,
                length,
            }
        } else {
            Line2 {
                origin,
                displace: Vector2::zero(),
                length: T::zero(),
            }
        }
    }

    pub fn from_two_points(origin: Point2<T>, towards: Point2<T>) -> Line2<T> {
        Self::from_origin_and_displace(origin, towards - origin)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length == T::zero()
    }

    /// The turn needed to go from this line's direction to `next`'s.
    ///
    /// Clockwise turns are positive and counter-clockwise turns negative, so a
    /// closed clockwise loop sums to a full positive revolution.
    pub fn turn_to(&self, next: &Line2<T>) -> Option<Turn<T>> {
        if self.is_degenerate() || next.is_degenerate() {
            return None;
        }
        let cosine = self.displace.dot(next.displace);
        let clamped = cosine.max(-T::one()).min(T::one());
        let unsigned = clamped.acos();
        let angle = if self.displace.perp_dot(next.displace) > T::zero() {
            -unsigned
        } else {
            unsigned
        };
        Some(Turn {
            angle: Rad(angle),
            cosine,
        })
    }
}

/// A signed turn between two directions, with the raw cosine it was computed
/// from. `cosine` is not clamped, so callers can tell how far rounding pushed
/// it outside `[-1, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Turn<T: BaseFloat> {
    pub angle: Rad<T>,
    pub cosine: T,
}

impl<T: BaseFloat> Turn<T> {
    pub fn cosine_excess(&self) -> T {
        (self.cosine.abs() - T::one()).max(T::zero())
    }
}

fn min_length<T: BaseFloat>() -> T {
    <T as NumCast>::from(1e-16).unwrap_or_else(T::zero)
}

#[cfg(test)]
mod test {
    use super::Line2d;
    use cgmath::Point2;
    use std::f64::consts::FRAC_PI_2;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Line2d {
        Line2d::from_two_points(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn right_turn_is_positive() {
        let up = line(0.0, 0.0, 0.0, 1.0);
        let right = line(0.0, 1.0, 1.0, 1.0);
        let turn = up.turn_to(&right).expect("both lines have a direction");
        assert!((turn.angle.0 - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(turn.cosine_excess(), 0.0);
    }

    #[test]
    fn left_turn_is_negative() {
        let right = line(0.0, 0.0, 2.0, 0.0);
        let up = line(2.0, 0.0, 2.0, 5.0);
        let turn = right.turn_to(&up).expect("both lines have a direction");
        assert!((turn.angle.0 + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn straight_line_does_not_turn() {
        let first = line(0.0, 0.0, 3.0, 3.0);
        let second = line(3.0, 3.0, 7.0, 7.0);
        let turn = first.turn_to(&second).expect("both lines have a direction");
        assert!(turn.angle.0.abs() < 1e-6);
    }

    #[test]
    fn degenerate_line_has_no_turn() {
        let point = line(1.0, 1.0, 1.0, 1.0);
        let other = line(1.0, 1.0, 2.0, 1.0);
        assert!(point.is_degenerate());
        assert!(point.turn_to(&other).is_none());
        assert!(other.turn_to(&point).is_none());
    }
}
