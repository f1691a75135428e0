use crate::geometry::transform::normal_matrix;
use crate::scene::mesh::{MeshBuffer, NormalSource};
use nalgebra::{Matrix4, Point3, Vector3};
use rayon::prelude::*;

/// 退化三角形的叉积模长平方下限
const DEGENERATE_NORMAL_EPSILON: f32 = 1e-18;

/// 一个物体变换到世界空间后的逐三角形几何数据。
/// 与相机完全无关，是二级缓存的值类型。
#[derive(Debug, Clone)]
pub struct WorldGeometry {
    pub vertices: Vec<[Point3<f32>; 3]>,
    pub normals: Vec<Vector3<f32>>,
    pub colors: Vec<[Vector3<f32>; 3]>,
}

impl WorldGeometry {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len()
    }
}

/// 两条边的叉积归一化；退化三角形回退到 +Z，避免 NaN 扩散
pub fn face_normal(v: &[Point3<f32>; 3]) -> Vector3<f32> {
    let cross = (v[1] - v[0]).cross(&(v[2] - v[0]));
    if cross.norm_squared() < DEGENERATE_NORMAL_EPSILON {
        return Vector3::z();
    }
    cross.normalize()
}

/// 网格整体变换到世界空间。
/// 顶点法线路径：逐顶点乘法线矩阵并归一化后求和再归一化，
/// 求和结果退化时回退到推导面法线。
pub fn transform_to_world(mesh: &MeshBuffer, model: &Matrix4<f32>) -> WorldGeometry {
    let nm = normal_matrix(model);
    let count = mesh.triangle_count();

    let rows: Vec<([Point3<f32>; 3], Vector3<f32>, [Vector3<f32>; 3])> = (0..count)
        .into_par_iter()
        .map(|tri| {
            let vertices = [
                model.transform_point(&mesh.position(tri, 0)),
                model.transform_point(&mesh.position(tri, 1)),
                model.transform_point(&mesh.position(tri, 2)),
            ];
            let normal = match mesh.normal_source() {
                NormalSource::Derived => face_normal(&vertices),
                NormalSource::Vertex => {
                    let mut sum = Vector3::zeros();
                    for k in 0..3 {
                        if let Some(n) = mesh.normal(tri, k) {
                            let transformed = nm * n;
                            if transformed.norm_squared() >= DEGENERATE_NORMAL_EPSILON {
                                sum += transformed.normalize();
                            }
                        }
                    }
                    if sum.norm_squared() < DEGENERATE_NORMAL_EPSILON {
                        face_normal(&vertices)
                    } else {
                        sum.normalize()
                    }
                }
            };
            let colors = [mesh.color(tri, 0), mesh.color(tri, 1), mesh.color(tri, 2)];
            (vertices, normal, colors)
        })
        .collect();

    let mut geometry = WorldGeometry {
        vertices: Vec::with_capacity(count),
        normals: Vec::with_capacity(count),
        colors: Vec::with_capacity(count),
    };
    for (vertices, normal, colors) in rows {
        geometry.vertices.push(vertices);
        geometry.normals.push(normal);
        geometry.colors.push(colors);
    }
    geometry
}
