use nalgebra::{Point3, Vector3, Vector4};

/// 法线与指向相机方向的点积。
/// 相机与质心重合时视线方向不可定义，按正面处理返回 1.0。
pub fn facing_ratio(
    vertices: &[Point3<f32>; 3],
    normal: &Vector3<f32>,
    camera_position: &Point3<f32>,
) -> f32 {
    let centroid = Point3::from(
        (vertices[0].coords + vertices[1].coords + vertices[2].coords) / 3.0,
    );
    let to_camera = camera_position - centroid;
    if to_camera.norm_squared() < 1e-12 {
        return 1.0;
    }
    normal.dot(&to_camera.normalize())
}

/// 严格大于零才算正面，点积为零的侧视三角形被剔除
pub fn is_front_facing(ratio: f32) -> bool {
    ratio > 0.0
}

/// 照明强度：朝向比钳到 [0, 1]，背离光源的面为全黑
pub fn shading_intensity(ratio: f32) -> f32 {
    ratio.clamp(0.0, 1.0)
}

/// 裁剪面比较的容差，恰好落在裁剪面上的顶点算作外侧
const CLIP_EPSILON: f32 = 1e-6;

/// 保守裁剪体测试：三个裁剪空间顶点全部在同一裁剪面外侧才判定不可见。
/// 跨越裁剪面的三角形一律保留，交由后续投影处理。
pub fn outside_single_plane(clip: &[Vector4<f32>; 3]) -> bool {
    clip.iter().all(|v| v.x < -v.w + CLIP_EPSILON)
        || clip.iter().all(|v| v.x > v.w - CLIP_EPSILON)
        || clip.iter().all(|v| v.y < -v.w + CLIP_EPSILON)
        || clip.iter().all(|v| v.y > v.w - CLIP_EPSILON)
        || clip.iter().all(|v| v.z < -v.w + CLIP_EPSILON)
        || clip.iter().all(|v| v.z > v.w - CLIP_EPSILON)
}

/// 屏幕空间三角形面积（鞋带公式）
pub fn screen_area(screen: &[[f32; 2]; 3]) -> f32 {
    let [[x1, y1], [x2, y2], [x3, y3]] = *screen;
    0.5 * (x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_at(z: f32) -> [Point3<f32>; 3] {
        [
            Point3::new(-1.0, -1.0, z),
            Point3::new(1.0, -1.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    #[test]
    fn facing_camera_gives_positive_ratio() {
        let vertices = triangle_at(-5.0);
        let ratio = facing_ratio(&vertices, &Vector3::z(), &Point3::origin());
        assert!(ratio > 0.99);
    }

    #[test]
    fn facing_away_gives_negative_ratio() {
        let vertices = triangle_at(-5.0);
        let ratio = facing_ratio(&vertices, &(-Vector3::z()), &Point3::origin());
        assert!(ratio < 0.0);
        assert!(!is_front_facing(ratio));
    }

    #[test]
    fn camera_at_centroid_counts_as_front() {
        let vertices = triangle_at(0.0);
        let centroid = Point3::new(0.0, -1.0 / 3.0, 0.0);
        assert_eq!(facing_ratio(&vertices, &Vector3::z(), &centroid), 1.0);
    }

    #[test]
    fn edge_on_triangle_is_culled() {
        assert!(!is_front_facing(0.0));
    }

    #[test]
    fn intensity_clamps_to_unit_range() {
        assert_eq!(shading_intensity(-0.5), 0.0);
        assert_eq!(shading_intensity(0.5), 0.5);
        assert_eq!(shading_intensity(1.5), 1.0);
    }

    #[test]
    fn fully_left_of_frustum_is_outside() {
        let clip = [
            Vector4::new(-3.0, 0.0, 0.0, 1.0),
            Vector4::new(-2.0, 1.0, 0.0, 1.0),
            Vector4::new(-4.0, -1.0, 0.0, 1.0),
        ];
        assert!(outside_single_plane(&clip));
    }

    #[test]
    fn straddling_triangle_is_kept() {
        // 一个顶点在左裁剪面外，两个在内
        let clip = [
            Vector4::new(-3.0, 0.0, 0.0, 1.0),
            Vector4::new(0.5, 1.0, 0.0, 1.0),
            Vector4::new(0.0, -1.0, 0.0, 1.0),
        ];
        assert!(!outside_single_plane(&clip));
    }

    #[test]
    fn corner_straddle_across_different_planes_is_kept() {
        // 三个顶点各超出不同的裁剪面，没有公共外侧面
        let clip = [
            Vector4::new(-3.0, 0.0, 0.0, 1.0),
            Vector4::new(3.0, 0.0, 0.0, 1.0),
            Vector4::new(0.0, 3.0, 0.0, 1.0),
        ];
        assert!(!outside_single_plane(&clip));
    }

    #[test]
    fn triangle_exactly_on_plane_is_outside() {
        // 三个顶点都恰好落在左裁剪面上 (x == -w)
        let clip = [
            Vector4::new(-1.0, 0.0, 0.0, 1.0),
            Vector4::new(-1.0, 0.5, 0.0, 1.0),
            Vector4::new(-1.0, -0.5, 0.0, 1.0),
        ];
        assert!(outside_single_plane(&clip));
    }

    #[test]
    fn behind_far_plane_is_outside() {
        let clip = [
            Vector4::new(0.0, 0.0, 2.0, 1.0),
            Vector4::new(0.1, 0.0, 3.0, 1.0),
            Vector4::new(0.0, 0.1, 2.5, 1.0),
        ];
        assert!(outside_single_plane(&clip));
    }

    #[test]
    fn screen_area_of_right_triangle() {
        let screen = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        assert!((screen_area(&screen) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_screen_triangle_has_zero_area() {
        let screen = [[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert!(screen_area(&screen).abs() < 1e-6);
    }
}
