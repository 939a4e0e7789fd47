//! Render-pass plumbing shared by the drawing modules.

use crate::polygon::GeometryError;

/// Outcome of draining the app's dirty flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderError<E> {
    /// The draw target rejected a primitive.
    Draw(E),
    /// Shape parameters were rejected before anything was drawn.
    InvalidArgument,
}

impl<E> From<GeometryError> for RenderError<E> {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidArgument => Self::InvalidArgument,
        }
    }
}
