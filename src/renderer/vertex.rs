//! Vertex type for the triangle pipeline

use bytemuck::{Pod, Zeroable};

/// Play-area vertex (pixels, y down) with a straight-alpha color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Fixed scene colors
pub mod colors {
    use crate::hex_color;

    pub const BACKGROUND: [f32; 4] = hex_color(0x0c0c0c);
    pub const OUTLINE: [f32; 4] = hex_color(0xffffff);
    pub const SHIP_BODY: [f32; 4] = hex_color(0x45b7d1);
    pub const ENGINE: [f32; 4] = hex_color(0xff6b6b);
    /// Pulsing ring around an invulnerable ship
    pub const DAMAGE_RING: [f32; 4] = hex_color(0xff6b6b);
    /// Overlay on a power-up about to expire
    pub const EXPIRY_WARNING: [f32; 4] = [1.0, 0.42, 0.42, 0.5];
}
