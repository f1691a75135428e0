use crate::geometry::transform::model_matrix;
use crate::scene::mesh::MeshBuffer;
use nalgebra::{Matrix4, Vector3};
use std::sync::Arc;

/// 物体的局部变换：位置 / 欧拉角(度) / 非均匀缩放
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub position: Vector3<f32>,
    pub rotation_deg: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation_deg: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl ObjectTransform {
    /// 九个变换参数的固定顺序展开，供缓存键按位指纹使用
    pub fn params(&self) -> [f32; 9] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation_deg.x,
            self.rotation_deg.y,
            self.rotation_deg.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        ]
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        model_matrix(&self.position, &self.rotation_deg, &self.scale)
    }
}

/// 场景中的一个可渲染单元：网格的共享引用加独立变换。
/// id 由调用方分配并保证唯一，是两级缓存键的组成部分。
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: u64,
    pub mesh: Arc<MeshBuffer>,
    pub transform: ObjectTransform,
}

impl SceneObject {
    pub fn new(id: u64, mesh: Arc<MeshBuffer>) -> Self {
        Self {
            id,
            mesh,
            transform: ObjectTransform::default(),
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation_deg: Vector3<f32>) -> Self {
        self.transform.rotation_deg = rotation_deg;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.transform.scale = scale;
        self
    }
}
