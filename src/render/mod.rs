//! CPU rendering: frame buffer, shaders, rasterizer and the frame driver.

pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;
pub mod shader;

pub use framebuffer::FrameBuffer;
pub use rasterizer::{EdgeFunctionRasterizer, ScreenVertex};
pub use renderer::{RenderStats, Renderer};
pub use shader::{Fragment, LitShader, ShadedVertex, Shader, UnshadedShader, Uniforms};
