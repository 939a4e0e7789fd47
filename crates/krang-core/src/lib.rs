#![cfg_attr(not(test), no_std)]

//! Board-independent watchface core: geometry, decorative animation, status
//! glyphs, persisted settings and the event-driven state machine that ties
//! them to a draw target.

pub mod app;
pub mod battery;
pub mod clock;
pub mod clock_text;
pub mod color;
pub mod flower;
pub mod geometry;
pub mod message;
pub mod polygon;
pub mod render;
pub mod settings;
pub mod status;

#[cfg(test)]
pub(crate) mod test_canvas;
