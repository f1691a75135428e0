use clap::Parser;
use log::info;
use nalgebra::Vector3;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

mod core;
mod geometry;
mod io;
mod scene;
mod sink;
mod utils;

use crate::core::frame_context::FrameContext;
use crate::core::renderer::Renderer;
use crate::geometry::camera::Camera;
use crate::io::args::Args;
use crate::io::obj_loader::load_obj_mesh;
use crate::io::render_settings::{parse_point3, parse_vec3};
use crate::scene::mesh::MeshBuffer;
use crate::scene::scene_object::SceneObject;
use crate::sink::FramebufferSink;

const BACKGROUND_COLOR: [u8; 3] = [24, 24, 32];
const DEFAULT_OBJ_COLOR: Vector3<f32> = Vector3::new(0.7, 0.7, 0.7);

fn main() -> Result<(), String> {
    env_logger::init();
    let args = Args::parse();
    let start_time = Instant::now();

    let settings = args.build_settings()?;
    settings.validate()?;

    std::fs::create_dir_all(&settings.output_dir)
        .map_err(|e| format!("无法创建输出目录 '{}': {}", settings.output_dir, e))?;

    // --- 加载模型 ---
    let mesh = match &settings.obj {
        Some(obj_path) => Arc::new(load_obj_mesh(obj_path, DEFAULT_OBJ_COLOR)?),
        None => {
            info!("未指定OBJ文件，使用内置立方体");
            Arc::new(MeshBuffer::unit_cube())
        }
    };

    let (position, rotation, scale) = settings.object_components()?;
    let object = SceneObject::new(1, mesh)
        .with_position(position)
        .with_rotation(rotation)
        .with_scale(scale);
    let objects = vec![object];

    // --- 设置相机 ---
    let aspect_ratio = settings.width as f32 / settings.height as f32;
    let mut camera = Camera::new_perspective(
        parse_point3(&settings.camera_from)?,
        parse_point3(&settings.camera_at)?,
        parse_vec3(&settings.camera_up)?,
        settings.camera_fov,
        aspect_ratio,
        settings.near,
        settings.far,
    );

    // --- 渲染循环 ---
    let mut renderer = Renderer::new(&settings)?;
    let mut sink = FramebufferSink::new(settings.width, settings.height, BACKGROUND_COLOR);
    let flags = settings.render_flags();

    for frame in 0..settings.frames {
        let context = FrameContext::new(&camera, settings.width, settings.height, flags);
        renderer.begin_frame(context);
        renderer.process_objects(&objects)?;
        sink.clear();
        let drawn = renderer.end_frame(&mut sink)?;

        let frame_path = Path::new(&settings.output_dir)
            .join(format!("{}_{:03}.png", settings.output, frame))
            .to_str()
            .ok_or("无法构造输出文件路径")?
            .to_string();
        sink.save_png(&frame_path)?;
        info!("帧 {frame}: 绘制 {drawn} 个三角形 -> {frame_path}");

        if settings.orbit_degrees_per_frame != 0.0 {
            camera.orbit_y(settings.orbit_degrees_per_frame);
        }
    }

    info!("渲染统计: {}", renderer.stats.summary());
    info!("总耗时: {:?}", start_time.elapsed());
    Ok(())
}
