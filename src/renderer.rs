//! Circle renderer
//!
//! Draws the pulse: clear to the background color, then one filled circle.
//! Positions are in window pixels with the origin at the top-left corner and
//! Y increasing downward; `ScreenProjection` maps them to clip space.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};

use crate::settings::Rgb;

/// Width of the anti-aliased rim in pixels
const EDGE_FEATHER: f32 = 1.0;

// ═══════════════════════════════════════════════════════════════════════════════
// PROJECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Orthographic projection for a pixel-sized target, origin top-left, Y down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenProjection {
    width: u32,
    height: u32,
    matrix: Mat4,
}

impl ScreenProjection {
    pub fn top_left(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let matrix = Mat4::orthographic_rh(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
        Self { width, height, matrix }
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Map a pixel position to normalized device coordinates
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        let clip = self.matrix * Vec4::new(x, y, 0.0, 1.0);
        Vec2::new(clip.x / clip.w, clip.y / clip.w)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CIRCLE RENDERER
// ═══════════════════════════════════════════════════════════════════════════════

/// Uniform block shared with `circle.wgsl` (96 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CircleUniforms {
    projection: [[f32; 4]; 4],
    center: [f32; 2],
    radius: f32,
    feather: f32,
    color: [f32; 4],
}

/// What to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFrame {
    /// Center in window pixels
    pub center: (f32, f32),
    pub radius: f32,
    pub foreground: Rgb,
    pub background: Rgb,
}

/// GPU pipeline for the pulsing circle
pub struct CircleRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    format: wgpu::TextureFormat,
    projection: ScreenProjection,
}

impl CircleRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Circle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/circle.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Circle Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Circle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Circle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Circle Uniform Buffer"),
            size: std::mem::size_of::<CircleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Circle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            format,
            projection: ScreenProjection::top_left(width, height),
        }
    }

    /// Tell the renderer the pixel size of its target
    pub fn set_projection(&mut self, projection: ScreenProjection) {
        if projection != self.projection {
            tracing::debug!("Projection set to {}x{}", projection.width, projection.height);
        }
        self.projection = projection;
    }

    pub fn projection(&self) -> &ScreenProjection {
        &self.projection
    }

    fn uniforms(&self, frame: &CircleFrame) -> CircleUniforms {
        let [r, g, b] = if self.format.is_srgb() {
            frame.foreground.to_linear()
        } else {
            [frame.foreground.r, frame.foreground.g, frame.foreground.b]
        };

        CircleUniforms {
            projection: self.projection.matrix().to_cols_array_2d(),
            center: [frame.center.0, frame.center.1],
            radius: frame.radius.max(0.0),
            feather: EDGE_FEATHER,
            color: [r, g, b, 1.0],
        }
    }

    /// Clear `view` to the background and draw the circle
    pub fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: &CircleFrame,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms(frame)));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Circle Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame.background.to_wgpu(self.format)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if frame.radius > 0.0 {
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }
    }
}

/// Clear `view` to a solid color (used for the companion window)
pub fn clear_to(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, color: wgpu::Color) {
    let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Solid Clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(color),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_projection_origin_is_top_left() {
        let projection = ScreenProjection::top_left(1920, 1080);
        assert!(approx(projection.to_ndc(0.0, 0.0), Vec2::new(-1.0, 1.0)));
        assert!(approx(projection.to_ndc(1920.0, 1080.0), Vec2::new(1.0, -1.0)));
        assert!(approx(projection.to_ndc(960.0, 540.0), Vec2::ZERO));
    }

    #[test]
    fn test_projection_y_increases_downward() {
        let projection = ScreenProjection::top_left(800, 600);
        let upper = projection.to_ndc(400.0, 100.0);
        let lower = projection.to_ndc(400.0, 500.0);
        assert!(upper.y > lower.y);
    }

    #[test]
    fn test_projection_depth_in_range() {
        let clip = ScreenProjection::top_left(800, 600).matrix() * Vec4::new(10.0, 10.0, 0.0, 1.0);
        assert!((0.0..=1.0).contains(&clip.z));
    }

    #[test]
    fn test_projection_zero_size_is_clamped() {
        assert_eq!(ScreenProjection::top_left(0, 0).size(), (1, 1));
    }

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<CircleUniforms>(), 96);
    }
}
