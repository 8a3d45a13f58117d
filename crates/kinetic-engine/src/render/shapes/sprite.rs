use std::collections::{HashMap, HashSet};

use bytemuck::{Pod, Zeroable};

use crate::bitmap::{Bitmap, BitmapId};
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    begin_load_pass, bind_quad, quad_pipeline, viewport_layout_entry, InstanceBuffer,
    QuadGeometry, ViewportBinding, QUAD_INDEX_COUNT,
};

/// Renderer for `DrawCmd::Sprite`.
///
/// Each distinct [`Bitmap`] is uploaded once into its own RGBA8 texture and
/// cached by id. Textures whose bitmap was not drawn in a frame are released.
pub struct SpriteRenderer {
    gpu: Option<SpriteGpu>,
    textures: HashMap<BitmapId, wgpu::BindGroup>,
    instances: InstanceBuffer,
    scratch: Vec<SpriteInstance>,
    scratch_ids: Vec<BitmapId>,
}

struct SpriteGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    viewport: ViewportBinding,
    quad: QuadGeometry,
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            gpu: None,
            textures: HashMap::new(),
            instances: InstanceBuffer::new("kinetic sprite instances"),
            scratch: Vec::new(),
            scratch_ids: Vec::new(),
        }
    }
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        let sprites: Vec<(Bitmap, [f32; 2], [f32; 2])> = draw_list
            .iter_in_paint_order()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Sprite(cmd) if !cmd.dst.is_empty() => {
                    let (min, max) = (cmd.dst.min(), cmd.dst.max());
                    Some((cmd.bitmap.clone(), [min.x, min.y], [max.x, max.y]))
                }
                _ => None,
            })
            .collect();

        if sprites.is_empty() {
            self.textures.clear();
            return;
        }

        self.ensure_gpu(ctx);

        self.scratch.clear();
        self.scratch_ids.clear();
        for (bitmap, dst_min, dst_max) in &sprites {
            self.ensure_texture(ctx, bitmap);
            self.scratch.push(SpriteInstance { dst_min: *dst_min, dst_max: *dst_max });
            self.scratch_ids.push(bitmap.id());
        }

        let live: HashSet<BitmapId> = self.scratch_ids.iter().copied().collect();
        self.textures.retain(|id, _| live.contains(id));

        let Some(gpu) = self.gpu.as_ref() else { return };
        gpu.viewport.write(ctx.queue, ctx.viewport);

        let Some(instance_vbo) = self.instances.upload(ctx, &self.scratch) else { return };

        let mut pass = begin_load_pass(target, "kinetic sprite pass");
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &gpu.viewport.bind_group, &[]);
        bind_quad(&mut pass, &gpu.quad, instance_vbo);

        for (i, id) in self.scratch_ids.iter().enumerate() {
            let Some(texture) = self.textures.get(id) else { continue };
            let i = i as u32;
            pass.set_bind_group(1, texture, &[]);
            pass.draw_indexed(0..QUAD_INDEX_COUNT, 0, i..i + 1);
        }
    }

    fn ensure_gpu(&mut self, ctx: &RenderCtx<'_>) {
        if self.gpu.as_ref().is_some_and(|g| g.format == ctx.surface_format) {
            return;
        }

        let viewport_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kinetic sprite viewport bgl"),
            entries: &[viewport_layout_entry()],
        });

        let texture_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kinetic sprite texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = quad_pipeline(
            ctx,
            "kinetic sprite pipeline",
            include_str!("shaders/sprite.wgsl"),
            &[&viewport_layout, &texture_layout],
            SpriteInstance::layout(),
        );

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kinetic sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        // Texture bind groups reference the old layout.
        self.textures.clear();
        self.gpu = Some(SpriteGpu {
            format: ctx.surface_format,
            pipeline,
            viewport: ViewportBinding::new(ctx.device, &viewport_layout, "kinetic sprite viewport"),
            texture_layout,
            sampler,
            quad: QuadGeometry::new(ctx.device, "kinetic sprite quad"),
        });
    }

    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, bitmap: &Bitmap) {
        if self.textures.contains_key(&bitmap.id()) {
            return;
        }
        let Some(gpu) = self.gpu.as_ref() else { return };

        // Match the surface's encoding so colors pass through unchanged.
        let format = if ctx.surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let size = wgpu::Extent3d {
            width: bitmap.width(),
            height: bitmap.height(),
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kinetic sprite texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bitmap.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width() * 4),
                rows_per_image: Some(bitmap.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kinetic sprite texture bind group"),
            layout: &gpu.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&gpu.sampler),
                },
            ],
        });

        log::debug!("uploaded sprite texture {}x{}", bitmap.width(), bitmap.height());
        self.textures.insert(bitmap.id(), bind_group);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (16 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpriteInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
