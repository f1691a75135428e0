use crate::geometry::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

/// 相机类，负责管理视角和投影变换。
/// 视图矩阵与投影矩阵在参数变动后一次性重算，帧内只读共享。
#[derive(Debug, Clone)]
pub struct Camera {
    /// 相机位置（眼睛位置）
    pub position: Point3<f32>,
    /// 相机观察点（目标位置）
    pub target: Point3<f32>,
    /// 相机上方向
    pub up: Vector3<f32>,
    /// 视场角（垂直方向，以弧度为单位）
    pub fov_y: f32,
    /// 宽高比（视口宽度/高度）
    pub aspect_ratio: f32,
    /// 近裁剪平面距离
    pub near: f32,
    /// 远裁剪平面距离
    pub far: f32,
    /// 视图矩阵（世界坐标 -> 相机坐标）
    view_matrix: Matrix4<f32>,
    /// 投影矩阵（相机坐标 -> 裁剪坐标）
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    /// 创建一个新的透视投影相机
    pub fn new_perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Camera {
            position,
            target,
            up: up.normalize(),
            fov_y: fov_y_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
            view_matrix: Matrix4::identity(),
            projection_matrix: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    /// 更新所有相机矩阵
    pub fn update_matrices(&mut self) {
        self.view_matrix = TransformFactory::view(&self.position, &self.target, &self.up);
        self.projection_matrix =
            TransformFactory::perspective(self.aspect_ratio, self.fov_y, self.near, self.far);
    }

    /// 围绕目标点进行任意轴旋转
    pub fn orbit(&mut self, axis: &Vector3<f32>, angle_rad: f32) {
        let target_to_camera = self.position - self.target;
        let rotation_matrix = TransformFactory::rotation(axis, angle_rad);
        let rotated = rotation_matrix.transform_vector(&target_to_camera);
        self.position = self.target + rotated;
        self.update_matrices();
    }

    /// 围绕Y轴旋转相机（简化的orbit方法）
    pub fn orbit_y(&mut self, angle_degrees: f32) {
        self.orbit(&Vector3::y_axis(), angle_degrees.to_radians());
    }

    /// 相机沿视线方向移动（正值接近目标，负值远离目标）
    pub fn dolly(&mut self, amount: f32) {
        let direction = (self.target - self.position).normalize();
        self.position += direction * amount;
        self.update_matrices();
    }

    /// 改变相机的宽高比
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.update_matrices();
    }

    /// 获取视图矩阵
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view_matrix
    }

    /// 获取投影矩阵
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_camera() -> Camera {
        Camera::new_perspective(
            Point3::new(0.0, 0.0, 3.0),
            Point3::origin(),
            Vector3::y(),
            45.0,
            4.0 / 3.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = test_camera();
        let before = (camera.position - camera.target).norm();
        camera.orbit_y(37.0);
        let after = (camera.position - camera.target).norm();
        assert!((before - after).abs() < 1e-5);
    }

    #[test]
    fn orbit_changes_view_matrix() {
        let mut camera = test_camera();
        let before = camera.view_matrix();
        camera.orbit_y(90.0);
        assert!((camera.view_matrix() - before).abs().max() > 1e-3);
    }

    #[test]
    fn aspect_change_updates_projection() {
        let mut camera = test_camera();
        let projection_before = camera.projection_matrix();
        let view_before = camera.view_matrix();
        camera.set_aspect_ratio(16.0 / 9.0);
        assert!((camera.projection_matrix() - projection_before).abs().max() > 1e-6);
        assert_eq!(camera.view_matrix(), view_before);
    }

    #[test]
    fn dolly_moves_along_view_axis() {
        let mut camera = test_camera();
        camera.dolly(1.0);
        assert!((camera.position.z - 2.0).abs() < 1e-6);
    }
}
