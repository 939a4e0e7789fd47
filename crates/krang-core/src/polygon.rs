//! Regular polygon construction and drawing.

use core::f64::consts::PI;

use embedded_graphics::{
    Drawable,
    draw_target::DrawTarget,
    primitives::{Line, Primitive, PrimitiveStyle, Triangle},
};

use crate::{
    geometry::{Point, rotate_point},
    render::RenderError,
};

/// Upper bound for [`Polygon::sides`], sized for the fixed vertex buffer.
pub const MAX_SIDES: usize = 16;

pub type Vertices = heapless::Vec<Point, MAX_SIDES>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeometryError {
    InvalidArgument,
}

/// How a polygon reaches the canvas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawMode {
    /// One line segment per edge.
    Outline,
    /// Solid interior.
    Filled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polygon {
    pub center: Point,
    pub sides: u8,
    /// Radians, applied to every vertex.
    pub rotation: f64,
    /// Distance from center to each vertex.
    pub radius: f64,
}

impl Polygon {
    pub const fn new(center: Point, sides: u8, rotation: f64, radius: f64) -> Self {
        Self {
            center,
            sides,
            rotation,
            radius,
        }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        let sides = self.sides as usize;
        if !(3..=MAX_SIDES).contains(&sides)
            || !(self.radius > 0.0)
            || !self.radius.is_finite()
            || !self.rotation.is_finite()
            || !self.center.is_finite()
        {
            return Err(GeometryError::InvalidArgument);
        }
        Ok(())
    }

    /// Vertices in drawing order, starting from the top vertex turned by
    /// `rotation`.
    pub fn vertices(&self) -> Result<Vertices, GeometryError> {
        self.validate()?;

        let first = self.center.offset(0.0, -self.radius);
        let step = 2.0 * PI / self.sides as f64;

        let mut vertices = Vertices::new();
        for index in 0..self.sides {
            let vertex = rotate_point(first, self.center, self.rotation + step * index as f64);
            vertices
                .push(vertex)
                .map_err(|_| GeometryError::InvalidArgument)?;
        }
        Ok(vertices)
    }

    pub fn draw<D>(
        &self,
        target: &mut D,
        mode: DrawMode,
        color: D::Color,
    ) -> Result<(), RenderError<D::Error>>
    where
        D: DrawTarget,
    {
        let vertices = self.vertices()?;
        draw_vertices(target, &vertices, mode, color).map_err(RenderError::Draw)
    }
}

/// Draws an already validated vertex ring.
pub fn draw_vertices<D>(
    target: &mut D,
    vertices: &[Point],
    mode: DrawMode,
    color: D::Color,
) -> Result<(), D::Error>
where
    D: DrawTarget,
{
    let count = vertices.len();
    if count < 3 {
        return Ok(());
    }

    match mode {
        DrawMode::Outline => {
            let style = PrimitiveStyle::with_stroke(color, 1);
            for index in 0..count {
                let from = vertices[index].to_pixel();
                let to = vertices[(index + 1) % count].to_pixel();
                Line::new(from, to).into_styled(style).draw(target)?;
            }
        }
        DrawMode::Filled => {
            // Regular polygons are convex, so a fan from the first vertex covers them.
            let style = PrimitiveStyle::with_fill(color);
            let anchor = vertices[0].to_pixel();
            for pair in vertices[1..].windows(2) {
                Triangle::new(anchor, pair[0].to_pixel(), pair[1].to_pixel())
                    .into_styled(style)
                    .draw(target)?;
            }
        }
    }

    Ok(())
}
