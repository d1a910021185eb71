//! Image and font preparation shared by the frame renderer and the compositor.

pub(crate) mod background;
pub(crate) mod decode;
pub(crate) mod text;
