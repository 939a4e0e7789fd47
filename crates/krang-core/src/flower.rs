//! Rotating arrangement of polygons drawn behind the clock.

use embedded_graphics::draw_target::DrawTarget;
use log::debug;

use crate::{
    geometry::{Point, degrees_to_radians, rotate_point},
    polygon::{DrawMode, GeometryError, Polygon},
    render::RenderError,
};

pub const STEPS_PER_TURN: u8 = 36;
pub const DEGREES_PER_STEP: i32 = 10;
/// Capacity of the per-frame polygon buffer.
pub const MAX_POLYGONS: usize = 25;

pub type Petals = heapless::Vec<Polygon, MAX_POLYGONS>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub const fn sign(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

/// Discrete rotation step shared by every polygon of the flower.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AnimationState {
    step: u8,
    direction: Direction,
}

impl AnimationState {
    pub const fn new(direction: Direction) -> Self {
        Self { step: 0, direction }
    }

    pub const fn step(&self) -> u8 {
        self.step
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Advances by `units_elapsed` steps in the current direction, wrapping
    /// into `0..36` for any input.
    pub fn on_tick(&mut self, units_elapsed: i32) {
        let next = self.step as i64 + self.direction.sign() * units_elapsed as i64;
        self.step = next.rem_euclid(STEPS_PER_TURN as i64) as u8;
    }

    pub const fn angle_degrees(&self) -> i32 {
        self.step as i32 * DEGREES_PER_STEP
    }

    pub fn angle_radians(&self) -> f64 {
        degrees_to_radians(self.angle_degrees())
    }
}

/// Chooses outline or fill for a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawPolicy {
    Fixed(DrawMode),
    /// Outlines on even steps, filled shapes on odd steps.
    AlternateByStep,
}

impl DrawPolicy {
    pub const fn mode_for(self, step: u8) -> DrawMode {
        match self {
            Self::Fixed(mode) => mode,
            Self::AlternateByStep if step % 2 == 0 => DrawMode::Outline,
            Self::AlternateByStep => DrawMode::Filled,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowerConfig {
    pub sides: u8,
    pub radius: f64,
    /// Horizontal ring offset, in multiples of `radius`.
    pub inner_offset: f64,
    /// Vertical ring offset, in multiples of `radius`.
    pub outer_offset: f64,
    pub petal_step_degrees: i32,
    pub policy: DrawPolicy,
}

impl Default for FlowerConfig {
    fn default() -> Self {
        Self {
            sides: 4,
            radius: 8.0,
            inner_offset: 2.0,
            outer_offset: 3.5,
            petal_step_degrees: 60,
            policy: DrawPolicy::AlternateByStep,
        }
    }
}

impl FlowerConfig {
    /// Copies placed on each side of a ring offset; the mirrored side covers
    /// the other half turn.
    pub fn petals_per_side(&self) -> Result<usize, GeometryError> {
        let step = self.petal_step_degrees;
        if step <= 0 || 180 % step != 0 {
            return Err(GeometryError::InvalidArgument);
        }
        Ok((180 / step) as usize)
    }

    /// Centre polygon plus both mirrored sides of the two rings.
    pub fn polygon_count(&self) -> Result<usize, GeometryError> {
        let count = 1 + 4 * self.petals_per_side()?;
        if count > MAX_POLYGONS {
            return Err(GeometryError::InvalidArgument);
        }
        Ok(count)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flower {
    config: FlowerConfig,
}

impl Flower {
    pub const fn new(config: FlowerConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &FlowerConfig {
        &self.config
    }

    /// Builds and validates every polygon of the frame.
    pub fn layout(
        &self,
        center: Point,
        animation: &AnimationState,
    ) -> Result<Petals, GeometryError> {
        let config = &self.config;
        let petals = config.petals_per_side()?;
        config.polygon_count()?;

        let angle = animation.angle_radians();
        let petal_step = degrees_to_radians(config.petal_step_degrees);
        let rings = [
            (config.inner_offset * config.radius, 0.0),
            (0.0, config.outer_offset * config.radius),
        ];

        let mut polygons = Petals::new();
        let mut push = |at: Point| -> Result<(), GeometryError> {
            let polygon = Polygon::new(at, config.sides, angle, config.radius);
            polygon.validate()?;
            polygons
                .push(polygon)
                .map_err(|_| GeometryError::InvalidArgument)
        };

        push(center)?;
        for (dx, dy) in rings {
            for sign in [1.0, -1.0] {
                let base = center.offset(sign * dx, sign * dy);
                for petal in 0..petals {
                    let turn = angle + petal_step * petal as f64;
                    push(rotate_point(base, center, turn))?;
                }
            }
        }

        Ok(polygons)
    }

    /// Draws the whole flower, or nothing when the layout is rejected.
    pub fn render<D>(
        &self,
        target: &mut D,
        center: Point,
        animation: &AnimationState,
        color: D::Color,
    ) -> Result<(), RenderError<D::Error>>
    where
        D: DrawTarget,
    {
        let polygons = self.layout(center, animation)?;
        self.draw_petals(target, &polygons, animation, color)
    }

    /// Draws a layout previously returned by [`Flower::layout`].
    pub fn draw_petals<D>(
        &self,
        target: &mut D,
        polygons: &[Polygon],
        animation: &AnimationState,
        color: D::Color,
    ) -> Result<(), RenderError<D::Error>>
    where
        D: DrawTarget,
    {
        let mode = self.config.policy.mode_for(animation.step());
        debug!(
            "flower: step={} polygons={} mode={:?}",
            animation.step(),
            polygons.len(),
            mode
        );

        for polygon in polygons {
            polygon.draw(target, mode, color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

    use super::*;
    use crate::test_canvas::Canvas;

    const EPS: f64 = 1e-9;

    #[test]
    fn six_forward_ticks_reach_sixty_degrees() {
        let mut animation = AnimationState::new(Direction::Forward);
        for _ in 0..6 {
            animation.on_tick(1);
        }
        assert_eq!(animation.step(), 6);
        assert_eq!(animation.angle_degrees(), 60);
    }

    #[test]
    fn step_stays_in_range_for_any_input() {
        let inputs = [0, 1, -1, 35, 36, 37, -36, -37, 1_000, -1_000, i32::MAX, i32::MIN];
        for direction in [Direction::Forward, Direction::Reverse] {
            let mut animation = AnimationState::new(direction);
            for units in inputs {
                animation.on_tick(units);
                assert!(animation.step() < STEPS_PER_TURN);
            }
        }
    }

    #[test]
    fn reverse_wraps_below_zero() {
        let mut animation = AnimationState::new(Direction::Reverse);
        animation.on_tick(1);
        assert_eq!(animation.step(), 35);
        animation.set_direction(Direction::Forward);
        animation.on_tick(2);
        assert_eq!(animation.step(), 1);
    }

    #[test]
    fn alternating_policy_follows_step_parity() {
        let policy = DrawPolicy::AlternateByStep;
        assert_eq!(policy.mode_for(0), DrawMode::Outline);
        assert_eq!(policy.mode_for(7), DrawMode::Filled);
        assert_eq!(
            DrawPolicy::Fixed(DrawMode::Filled).mode_for(4),
            DrawMode::Filled
        );
    }

    #[test]
    fn default_layout_is_a_hexagonal_flower() {
        let flower = Flower::default();
        let center = Point::new(88.0, 88.0);
        let polygons = flower.layout(center, &AnimationState::default()).unwrap();

        assert_eq!(polygons.len(), 13);
        assert_eq!(polygons[0].center, center);

        let inner = polygons[1..7]
            .iter()
            .filter(|p| (libm::hypot(p.center.x - 88.0, p.center.y - 88.0) - 16.0).abs() < EPS)
            .count();
        let outer = polygons[7..]
            .iter()
            .filter(|p| (libm::hypot(p.center.x - 88.0, p.center.y - 88.0) - 28.0).abs() < EPS)
            .count();
        assert_eq!((inner, outer), (6, 6));
    }

    #[test]
    fn every_polygon_shares_the_animation_angle() {
        let mut animation = AnimationState::default();
        animation.on_tick(3);
        let polygons = Flower::default()
            .layout(Point::new(50.0, 50.0), &animation)
            .unwrap();

        let first_petal = polygons[1].center;
        assert!((first_petal.x - (50.0 + 16.0 * libm::cos(PI_SIXTH))).abs() < EPS);
        assert!((first_petal.y - (50.0 + 16.0 * libm::sin(PI_SIXTH))).abs() < EPS);
        for polygon in &polygons {
            assert!((polygon.rotation - animation.angle_radians()).abs() < EPS);
        }
    }

    const PI_SIXTH: f64 = core::f64::consts::PI / 6.0;

    #[test]
    fn bad_petal_step_or_radius_draws_nothing() {
        let configs = [
            FlowerConfig {
                petal_step_degrees: 0,
                ..FlowerConfig::default()
            },
            FlowerConfig {
                petal_step_degrees: 70,
                ..FlowerConfig::default()
            },
            FlowerConfig {
                petal_step_degrees: 20,
                ..FlowerConfig::default()
            },
            FlowerConfig {
                radius: 0.0,
                ..FlowerConfig::default()
            },
            FlowerConfig {
                sides: 2,
                ..FlowerConfig::default()
            },
        ];

        for config in configs {
            let mut canvas = Canvas::new(176, 176);
            let result = Flower::new(config).render(
                &mut canvas,
                Point::new(88.0, 88.0),
                &AnimationState::default(),
                Rgb888::BLUE,
            );
            assert_eq!(result, Err(RenderError::InvalidArgument));
            assert_eq!(canvas.drawn_pixels(), 0);
        }
    }

    #[test]
    fn render_touches_every_polygon_center_when_filled() {
        let flower = Flower::new(FlowerConfig {
            policy: DrawPolicy::Fixed(DrawMode::Filled),
            ..FlowerConfig::default()
        });
        let center = Point::new(88.0, 88.0);
        let animation = AnimationState::default();
        let mut canvas = Canvas::new(176, 176);

        flower
            .render(&mut canvas, center, &animation, Rgb888::BLUE)
            .unwrap();

        for polygon in flower.layout(center, &animation).unwrap() {
            let p = polygon.center.to_pixel();
            assert_eq!(canvas.pixel(p.x, p.y), Some(Rgb888::BLUE));
        }
    }
}
