use nalgebra::{Point3, Vector3};

/// 顶点记录中颜色缺失时使用的默认灰色
const DEFAULT_VERTEX_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// 面法线来源，载入时一次性确定，避免逐三角形的运行时分支判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    /// 顶点自带法线（stride ≥ 9），面法线取三个变换后顶点法线的平均
    Vertex,
    /// 网格无法线，由两条边的叉积推导平面法线
    Derived,
}

/// 不可变的扁平顶点缓冲。
/// 每条顶点记录 = 位置3 + 颜色3 + 可选法线3，连续三条记录构成一个三角形。
/// stride 与法线标志在构造时固定，管线阶段从不重新推断。
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    data: Vec<f32>,
    stride: usize,
    has_normals: bool,
}

impl MeshBuffer {
    pub fn new(data: Vec<f32>, stride: usize, has_normals: bool) -> Result<Self, String> {
        if stride < 3 {
            return Err(format!("顶点记录宽度至少为3，得到 {stride}"));
        }
        if has_normals && stride < 9 {
            return Err(format!("带法线的顶点记录宽度至少为9，得到 {stride}"));
        }
        if data.len() % (stride * 3) != 0 {
            return Err(format!(
                "顶点数据长度 {} 不是每三角形浮点数 {} 的整数倍",
                data.len(),
                stride * 3
            ));
        }
        Ok(Self {
            data,
            stride,
            has_normals,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.data.len() / (self.stride * 3)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn has_normals(&self) -> bool {
        self.has_normals
    }

    pub fn normal_source(&self) -> NormalSource {
        if self.has_normals {
            NormalSource::Vertex
        } else {
            NormalSource::Derived
        }
    }

    fn record_base(&self, tri: usize, k: usize) -> usize {
        (tri * 3 + k) * self.stride
    }

    /// 第 tri 个三角形第 k 个顶点的局部空间位置
    pub fn position(&self, tri: usize, k: usize) -> Point3<f32> {
        let base = self.record_base(tri, k);
        Point3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }

    /// 顶点颜色；记录宽度不足6时回退到默认灰
    pub fn color(&self, tri: usize, k: usize) -> Vector3<f32> {
        if self.stride < 6 {
            return Vector3::from(DEFAULT_VERTEX_COLOR);
        }
        let base = self.record_base(tri, k) + 3;
        Vector3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }

    /// 顶点法线；仅当网格带法线时存在
    pub fn normal(&self, tri: usize, k: usize) -> Option<Vector3<f32>> {
        if !self.has_normals {
            return None;
        }
        let base = self.record_base(tri, k) + 6;
        Some(Vector3::new(
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
        ))
    }

    /// 内置单位立方体：12个三角形，每面一种颜色，无顶点法线。
    /// 各面从外侧看为逆时针环绕，推导法线指向外。
    pub fn unit_cube() -> Self {
        let corners: [[f32; 3]; 8] = [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ];
        let faces: [([usize; 4], [f32; 3]); 6] = [
            ([4, 5, 6, 7], [0.9, 0.2, 0.2]), // +Z
            ([1, 0, 3, 2], [0.2, 0.9, 0.2]), // -Z
            ([5, 1, 2, 6], [0.2, 0.2, 0.9]), // +X
            ([0, 4, 7, 3], [0.9, 0.9, 0.2]), // -X
            ([7, 6, 2, 3], [0.2, 0.9, 0.9]), // +Y
            ([0, 1, 5, 4], [0.9, 0.2, 0.9]), // -Y
        ];

        let mut data = Vec::with_capacity(6 * 6 * 6);
        for (quad, color) in &faces {
            for idx in [quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]] {
                data.extend_from_slice(&corners[idx]);
                data.extend_from_slice(color);
            }
        }
        Self {
            data,
            stride: 6,
            has_normals: false,
        }
    }
}
