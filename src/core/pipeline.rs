use crate::core::frame_context::FrameContext;
use crate::core::projection::{project_triangle, world_to_clip, ScreenTriangle};
use crate::core::visibility::{
    facing_ratio, is_front_facing, outside_single_plane, screen_area, shading_intensity,
};
use crate::core::world_transform::WorldGeometry;
use crate::utils::color::{face_debug_color, to_rgb8};
use nalgebra::{Vector3, Vector4};
use rayon::prelude::*;

/// 单个世界空间三角形走完剔除 / 着色 / 投影全流程。
/// 任一阶段剔除即返回 None。各阶段顺序固定：
/// 背面剔除在先（最便宜且依赖已有法线），再裁剪测试，最后投影与小面积剔除。
pub fn process_triangle(
    ctx: &FrameContext,
    geometry: &WorldGeometry,
    tri: usize,
) -> Option<ScreenTriangle> {
    let vertices = &geometry.vertices[tri];
    let normal = &geometry.normals[tri];
    let flags = &ctx.flags;

    let ratio = facing_ratio(vertices, normal, &ctx.camera_position);
    if flags.backface_culling && !is_front_facing(ratio) {
        return None;
    }

    let mut clip = [Vector4::zeros(); 3];
    let mut view_z = [0.0f32; 3];
    for k in 0..3 {
        let (c, z) = world_to_clip(ctx, &vertices[k]);
        clip[k] = c;
        view_z[k] = z;
    }
    if flags.clip_test && outside_single_plane(&clip) {
        return None;
    }

    let (screen, depth) = project_triangle(ctx, &clip, &view_z)?;
    if flags.cull_small_triangles && screen_area(&screen) < flags.min_triangle_area {
        return None;
    }

    let base: Vector3<f32> = if flags.colorize {
        face_debug_color(tri)
    } else {
        (geometry.colors[tri][0] + geometry.colors[tri][1] + geometry.colors[tri][2]) / 3.0
    };
    let shaded = if flags.use_lighting {
        base * shading_intensity(ratio)
    } else {
        base
    };

    Some(ScreenTriangle {
        screen,
        depth,
        color: to_rgb8(&shaded),
    })
}

/// 一个物体的世界几何批量处理为屏幕三角形。
/// 按索引并行映射后收集，输出顺序与三角形序号一致，与线程数无关。
pub fn world_to_screen(ctx: &FrameContext, geometry: &WorldGeometry) -> Vec<ScreenTriangle> {
    (0..geometry.triangle_count())
        .into_par_iter()
        .filter_map(|tri| process_triangle(ctx, geometry, tri))
        .collect()
}
