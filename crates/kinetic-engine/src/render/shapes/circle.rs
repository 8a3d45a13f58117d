use bytemuck::{Pod, Zeroable};

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    begin_load_pass, bind_quad, quad_pipeline, viewport_layout_entry, InstanceBuffer,
    QuadGeometry, ViewportBinding, QUAD_INDEX_COUNT,
};

/// Renderer for `DrawCmd::Circle`.
///
/// Fills are solid colors with a one-pixel analytic AA edge.
pub struct CircleRenderer {
    gpu: Option<CircleGpu>,
    instances: InstanceBuffer,
    scratch: Vec<CircleInstance>,
}

struct CircleGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    viewport: ViewportBinding,
    quad: QuadGeometry,
}

impl Default for CircleRenderer {
    fn default() -> Self {
        Self {
            gpu: None,
            instances: InstanceBuffer::new("kinetic circle instances"),
            scratch: Vec::new(),
        }
    }
}

impl CircleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        self.scratch.clear();
        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Circle(cmd) = &item.cmd else { continue };
            if cmd.radius <= 0.0 {
                continue;
            }

            self.scratch.push(CircleInstance {
                center: [cmd.center.x, cmd.center.y],
                radius: cmd.radius,
                color: cmd.color.to_array(),
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        self.ensure_gpu(ctx);
        let Some(gpu) = self.gpu.as_ref() else { return };
        gpu.viewport.write(ctx.queue, ctx.viewport);

        let Some(instance_vbo) = self.instances.upload(ctx, &self.scratch) else { return };

        let mut pass = begin_load_pass(target, "kinetic circle pass");
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &gpu.viewport.bind_group, &[]);
        bind_quad(&mut pass, &gpu.quad, instance_vbo);
        pass.draw_indexed(0..QUAD_INDEX_COUNT, 0, 0..self.scratch.len() as u32);
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) {
        if self.gpu.as_ref().is_some_and(|g| g.format == ctx.surface_format) {
            return;
        }

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kinetic circle bgl"),
            entries: &[viewport_layout_entry()],
        });

        let pipeline = quad_pipeline(
            ctx,
            "kinetic circle pipeline",
            include_str!("shaders/circle.wgsl"),
            &[&bgl],
            CircleInstance::layout(),
        );

        self.gpu = Some(CircleGpu {
            format: ctx.surface_format,
            pipeline,
            viewport: ViewportBinding::new(ctx.device, &bgl, "kinetic circle viewport"),
            quad: QuadGeometry::new(ctx.device, "kinetic circle quad"),
        });
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (28 bytes):
///
///  offset  0  center  [f32; 2]  loc 1
///  offset  8  radius  f32       loc 2
///  offset 12  color   [f32; 4]  loc 3
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CircleInstance {
    center: [f32; 2],
    radius: f32,
    color: [f32; 4],
}

impl CircleInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32,
        3 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_matches_vertex_layout() {
        assert_eq!(std::mem::size_of::<CircleInstance>(), 28);
        let last = CircleInstance::ATTRS[2];
        assert_eq!((last.shader_location, last.offset), (3, 12));
    }
}
