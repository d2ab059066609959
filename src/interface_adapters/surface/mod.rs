// Drawing surfaces implementing the domain `Canvas` port.

pub mod font;
pub mod framebuffer;
pub mod recorder;

pub use framebuffer::{FrameImage, Framebuffer};
pub use recorder::{CommandRecorder, DrawCommand};
