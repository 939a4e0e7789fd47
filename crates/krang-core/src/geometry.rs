//! Angle conversion and 2D rotation helpers.

use core::f64::consts::PI;

use embedded_graphics::prelude::Point as PixelPoint;

/// Sub-pixel coordinate used while building shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Nearest integer pixel.
    pub fn to_pixel(self) -> PixelPoint {
        PixelPoint::new(libm::round(self.x) as i32, libm::round(self.y) as i32)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<PixelPoint> for Point {
    fn from(point: PixelPoint) -> Self {
        Self::new(point.x as f64, point.y as f64)
    }
}

pub fn degrees_to_radians(angle: i32) -> f64 {
    angle as f64 * PI / 180.0
}

pub fn radians_to_degrees(angle: f64) -> f64 {
    angle * 180.0 / PI
}

/// Rotates `p` around `pivot` by `angle` radians (counter-clockwise in a
/// y-up frame, clockwise on screen).
pub fn rotate_point(p: Point, pivot: Point, angle: f64) -> Point {
    let (sin, cos) = (libm::sin(angle), libm::cos(angle));
    let x = p.x - pivot.x;
    let y = p.y - pivot.y;

    Point {
        x: x * cos - y * sin + pivot.x,
        y: x * sin + y * cos + pivot.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn degree_conversion_hits_known_angles() {
        assert_eq!(degrees_to_radians(0), 0.0);
        assert!((degrees_to_radians(180) - PI).abs() < EPS);
        assert!((degrees_to_radians(-90) + PI / 2.0).abs() < EPS);
        assert!((radians_to_degrees(PI / 3.0) - 60.0).abs() < EPS);
    }

    #[test]
    fn quarter_turn_about_pivot() {
        let pivot = Point::new(10.0, 10.0);
        let rotated = rotate_point(Point::new(15.0, 10.0), pivot, degrees_to_radians(90));
        assert_close(rotated, Point::new(10.0, 15.0));
    }

    #[test]
    fn rotating_forward_then_back_returns_original() {
        let pivots = [Point::new(0.0, 0.0), Point::new(88.0, 55.0), Point::new(-3.5, 7.25)];
        let points = [Point::new(1.0, 2.0), Point::new(-40.0, 13.0), Point::new(176.0, 0.5)];

        for pivot in pivots {
            for p in points {
                for degrees in (-720..=720).step_by(35) {
                    let theta = degrees_to_radians(degrees) + 0.123;
                    let back = rotate_point(rotate_point(p, pivot, theta), pivot, -theta);
                    assert_close(back, p);
                }
            }
        }
    }

    #[test]
    fn pivot_is_a_fixed_point() {
        let pivot = Point::new(4.0, -2.0);
        assert_close(rotate_point(pivot, pivot, 1.7), pivot);
    }

    #[test]
    fn pixel_conversion_rounds_to_nearest() {
        assert_eq!(Point::new(1.49, 2.5).to_pixel(), PixelPoint::new(1, 3));
        assert_eq!(Point::new(-0.6, 0.4).to_pixel(), PixelPoint::new(-1, 0));
    }
}
