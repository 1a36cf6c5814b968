//! Drawing vocabulary used by primitive views and overlay collection.

mod frame;
mod primitives;

pub use frame::{OverlayFrame, OverlayShape};
pub use primitives::{Color, LinePrimitive, RectPrimitive, TextHAlign, TextPrimitive};
