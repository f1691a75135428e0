use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 按面序号生成稳定的调试颜色。
/// 以序号为种子，同一面在任意帧 / 任意线程下颜色一致。
/// 分量范围 [0.3, 0.7)，避免纯黑纯白难以分辨。
pub fn face_debug_color(face_index: usize) -> Vector3<f32> {
    let mut rng = StdRng::seed_from_u64(face_index as u64);
    Vector3::new(
        0.3 + rng.random::<f32>() * 0.4,
        0.3 + rng.random::<f32>() * 0.4,
        0.3 + rng.random::<f32>() * 0.4,
    )
}

/// 线性浮点颜色转 8 位 RGB，分量先钳到 [0, 1]
pub fn to_rgb8(color: &Vector3<f32>) -> [u8; 3] {
    [
        (color.x.clamp(0.0, 1.0) * 255.0) as u8,
        (color.y.clamp(0.0, 1.0) * 255.0) as u8,
        (color.z.clamp(0.0, 1.0) * 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_color_is_deterministic_per_face() {
        assert_eq!(face_debug_color(7), face_debug_color(7));
        assert_ne!(face_debug_color(7), face_debug_color(8));
    }

    #[test]
    fn debug_color_stays_in_mid_range() {
        for face in 0..100 {
            let c = face_debug_color(face);
            for v in [c.x, c.y, c.z] {
                assert!((0.3..0.7).contains(&v));
            }
        }
    }

    #[test]
    fn rgb8_clamps_out_of_range_components() {
        assert_eq!(to_rgb8(&Vector3::new(-1.0, 0.5, 2.0)), [0, 127, 255]);
    }
}
