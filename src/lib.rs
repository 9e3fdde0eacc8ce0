// Library exports for agridash

pub mod chart;
pub mod data;
pub mod figure;
pub mod page;
pub mod palette;
pub mod pipeline;

/// Pixel dimensions for chart rendering
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 960,
            height: 600,
        }
    }
}
