use crate::geometry::camera::Camera;
use nalgebra::{Matrix4, Point3};

/// 帧级管线开关，对整帧所有物体统一生效
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFlags {
    /// 方向光照明（强度为法线与视线方向点积）
    pub use_lighting: bool,
    /// 背面剔除
    pub backface_culling: bool,
    /// 保守裁剪体测试（三顶点同侧超出同一裁剪面才剔除）
    pub clip_test: bool,
    /// 画家算法深度排序（远到近）
    pub sort_triangles: bool,
    /// 按面序号着调试色替代顶点颜色
    pub colorize: bool,
    /// 剔除投影后屏幕面积过小的三角形
    pub cull_small_triangles: bool,
    /// 小三角形剔除的面积阈值（平方像素）
    pub min_triangle_area: f32,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            use_lighting: true,
            backface_culling: true,
            clip_test: true,
            sort_triangles: true,
            colorize: false,
            cull_small_triangles: false,
            min_triangle_area: 1.0,
        }
    }
}

/// 一帧的只读相机快照与视口参数。
/// 帧开始时从相机采样一次，帧内不再读相机本体。
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub view_matrix: Matrix4<f32>,
    pub projection_matrix: Matrix4<f32>,
    pub camera_position: Point3<f32>,
    pub width: usize,
    pub height: usize,
    pub flags: RenderFlags,
}

impl FrameContext {
    pub fn new(camera: &Camera, width: usize, height: usize, flags: RenderFlags) -> Self {
        Self {
            view_matrix: camera.view_matrix(),
            projection_matrix: camera.projection_matrix(),
            camera_position: camera.position,
            width,
            height,
            flags,
        }
    }
}
