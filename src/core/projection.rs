use crate::core::frame_context::FrameContext;
use crate::geometry::transform::ndc_to_screen;
use nalgebra::{Point3, Vector4};

/// 透视除法的 w 下限，任一顶点低于此值整个三角形作废
pub const MIN_CLIP_W: f32 = 1e-6;

/// 投影完成的屏幕三角形，画家算法排序与绘制的最终单元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub screen: [[f32; 2]; 3],
    /// 三顶点视空间深度均值取负，值越大离相机越远
    pub depth: f32,
    pub color: [u8; 3],
}

/// 世界坐标点变换到裁剪空间，同时返回视空间 z 供深度键使用
pub fn world_to_clip(ctx: &FrameContext, world: &Point3<f32>) -> (Vector4<f32>, f32) {
    let view = ctx.view_matrix * Vector4::new(world.x, world.y, world.z, 1.0);
    let clip = ctx.projection_matrix * view;
    (clip, view.z)
}

/// 透视除法加视口映射。
/// 任一顶点的 w 过小（相机后方或紧贴相机）时放弃整个三角形。
pub fn project_triangle(
    ctx: &FrameContext,
    clip: &[Vector4<f32>; 3],
    view_z: &[f32; 3],
) -> Option<([[f32; 2]; 3], f32)> {
    let mut screen = [[0.0f32; 2]; 3];
    for k in 0..3 {
        if clip[k].w <= MIN_CLIP_W {
            return None;
        }
        let inv_w = 1.0 / clip[k].w;
        let (x, y) = ndc_to_screen(
            clip[k].x * inv_w,
            clip[k].y * inv_w,
            ctx.width as f32,
            ctx.height as f32,
        );
        screen[k] = [x, y];
    }
    let depth = -(view_z[0] + view_z[1] + view_z[2]) / 3.0;
    Some((screen, depth))
}
