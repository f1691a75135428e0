use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

/// 变换矩阵工厂，提供创建各种变换矩阵的静态方法
pub struct TransformFactory;

impl TransformFactory {
    /// 创建绕任意轴旋转的变换矩阵
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        let axis_unit = Unit::new_normalize(*axis);
        Matrix4::from(Rotation3::from_axis_angle(&axis_unit, angle_rad))
    }

    /// 创建绕X轴旋转的变换矩阵
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        Matrix4::from_euler_angles(angle_rad, 0.0, 0.0)
    }

    /// 创建绕Y轴旋转的变换矩阵
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        Matrix4::from_euler_angles(0.0, angle_rad, 0.0)
    }

    /// 创建绕Z轴旋转的变换矩阵
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        Matrix4::from_euler_angles(0.0, 0.0, angle_rad)
    }

    /// 创建平移矩阵
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(translation)
    }

    /// 创建非均匀缩放矩阵
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// 创建视图矩阵 (lookAt)
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::look_at_rh(eye, target, &up.normalize())
    }

    /// 创建透视投影矩阵
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect_ratio, fov_y_rad, near, far)
    }
}

/// 由位置 / 欧拉角(度) / 缩放构造模型矩阵。
/// 组合顺序固定为 T·Rz·Ry·Rx·S。
pub fn model_matrix(
    position: &Vector3<f32>,
    rotation_deg: &Vector3<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    let t = TransformFactory::translation(position);
    let rz = TransformFactory::rotation_z(rotation_deg.z.to_radians());
    let ry = TransformFactory::rotation_y(rotation_deg.y.to_radians());
    let rx = TransformFactory::rotation_x(rotation_deg.x.to_radians());
    let s = TransformFactory::scaling_nonuniform(scale);
    t * rz * ry * rx * s
}

/// 法线变换矩阵：取模型矩阵的左上 3×3。
/// 不取逆转置——非均匀缩放下法线会偏斜，这是保留的既定近似。
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    model.fixed_view::<3, 3>(0, 0).into_owned()
}

/// NDC → 屏幕像素坐标。Y 轴翻转：NDC 中 +1 在顶部，屏幕原点在左上角。
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> (f32, f32) {
    ((ndc_x + 1.0) * 0.5 * width, (1.0 - ndc_y) * 0.5 * height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn model_matrix_composition_order() {
        let position = Vector3::new(1.0, 2.0, 3.0);
        let rotation = Vector3::new(10.0, 20.0, 30.0);
        let scale = Vector3::new(2.0, 1.0, 0.5);

        let expected = TransformFactory::translation(&position)
            * TransformFactory::rotation_z(30.0f32.to_radians())
            * TransformFactory::rotation_y(20.0f32.to_radians())
            * TransformFactory::rotation_x(10.0f32.to_radians())
            * TransformFactory::scaling_nonuniform(&scale);

        let m = model_matrix(&position, &rotation, &scale);
        assert!((m - expected).abs().max() < 1e-6);
    }

    #[test]
    fn model_matrix_rotates_x_axis_to_y_under_z90() {
        let m = model_matrix(
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, 90.0),
            &Vector3::new(1.0, 1.0, 1.0),
        );
        let v = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_ignores_translation() {
        let m = model_matrix(
            &Vector3::new(5.0, -3.0, 2.0),
            &Vector3::zeros(),
            &Vector3::new(1.0, 1.0, 1.0),
        );
        assert!((normal_matrix(&m) - Matrix3::identity()).abs().max() < 1e-6);
    }

    #[test]
    fn ndc_origin_maps_to_screen_center() {
        let (x, y) = ndc_to_screen(0.0, 0.0, 800.0, 600.0);
        assert_eq!((x, y), (400.0, 300.0));
    }

    #[test]
    fn ndc_top_left_maps_to_pixel_origin() {
        let (x, y) = ndc_to_screen(-1.0, 1.0, 800.0, 600.0);
        assert_eq!((x, y), (0.0, 0.0));
    }
}
