use crate::core::frame_context::RenderFlags;
use nalgebra::{Point3, Vector3};

/// 渲染设置统一结构体，命令行与TOML配置的公共落点
#[derive(Debug, Clone)]
pub struct RenderSettings {
    // === 文件设置 ===
    /// OBJ文件路径，缺省时使用内置立方体
    pub obj: Option<String>,
    /// 输出文件名前缀
    pub output: String,
    /// 输出目录
    pub output_dir: String,

    // === 视口设置 ===
    pub width: usize,
    pub height: usize,

    // === 管线开关 ===
    pub use_lighting: bool,
    pub backface_culling: bool,
    pub clip_test: bool,
    pub sort_triangles: bool,
    pub colorize: bool,
    pub cull_small_triangles: bool,
    pub min_triangle_area: f32,

    // === 缓存与并行 ===
    /// 一级缓存（屏幕三角形）容量
    pub tier1_capacity: usize,
    /// 二级缓存（世界几何）容量
    pub tier2_capacity: usize,
    /// 工作线程数，0表示按CPU核数
    pub num_threads: usize,

    // === 相机设置 ===
    /// 相机位置 "x,y,z"
    pub camera_from: String,
    /// 观察目标 "x,y,z"
    pub camera_at: String,
    /// 上方向 "x,y,z"
    pub camera_up: String,
    /// 垂直视场角（度）
    pub camera_fov: f32,
    pub near: f32,
    pub far: f32,

    // === 动画设置 ===
    /// 渲染帧数
    pub frames: usize,
    /// 每帧相机绕Y轴旋转角度（度）
    pub orbit_degrees_per_frame: f32,

    // === 物体设置 ===
    pub object_position: String,
    pub object_rotation: String,
    pub object_scale: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            obj: None,
            output: "output".to_string(),
            output_dir: "output".to_string(),
            width: 800,
            height: 600,
            use_lighting: true,
            backface_culling: true,
            clip_test: true,
            sort_triangles: true,
            colorize: false,
            cull_small_triangles: false,
            min_triangle_area: 1.0,
            tier1_capacity: 64,
            tier2_capacity: 64,
            num_threads: 0,
            camera_from: "0,0,3".to_string(),
            camera_at: "0,0,0".to_string(),
            camera_up: "0,1,0".to_string(),
            camera_fov: 45.0,
            near: 0.1,
            far: 100.0,
            frames: 1,
            orbit_degrees_per_frame: 0.0,
            object_position: "0,0,0".to_string(),
            object_rotation: "0,0,0".to_string(),
            object_scale: "1,1,1".to_string(),
        }
    }
}

/// 解析 "x,y,z" 格式的三维向量
pub fn parse_vec3(s: &str) -> Result<Vector3<f32>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("无效的向量格式 '{s}'，应为 \"x,y,z\""));
    }
    let mut values = [0.0f32; 3];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part
            .parse::<f32>()
            .map_err(|_| format!("无法解析数值 '{part}'（来自 '{s}'）"))?;
    }
    Ok(Vector3::new(values[0], values[1], values[2]))
}

/// 解析 "x,y,z" 格式的三维点
pub fn parse_point3(s: &str) -> Result<Point3<f32>, String> {
    parse_vec3(s).map(Point3::from)
}

impl RenderSettings {
    /// 提取帧级管线开关
    pub fn render_flags(&self) -> RenderFlags {
        RenderFlags {
            use_lighting: self.use_lighting,
            backface_culling: self.backface_culling,
            clip_test: self.clip_test,
            sort_triangles: self.sort_triangles,
            colorize: self.colorize,
            cull_small_triangles: self.cull_small_triangles,
            min_triangle_area: self.min_triangle_area,
        }
    }

    /// 解析物体变换三元组
    pub fn object_components(
        &self,
    ) -> Result<(Vector3<f32>, Vector3<f32>, Vector3<f32>), String> {
        Ok((
            parse_vec3(&self.object_position)?,
            parse_vec3(&self.object_rotation)?,
            parse_vec3(&self.object_scale)?,
        ))
    }

    /// 校验设置合法性。缓存容量为0是致命错误而非降级运行。
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "视口尺寸必须为正，得到 {}x{}",
                self.width, self.height
            ));
        }
        if self.tier1_capacity == 0 {
            return Err("一级缓存容量必须大于0".to_string());
        }
        if self.tier2_capacity == 0 {
            return Err("二级缓存容量必须大于0".to_string());
        }
        if self.frames == 0 {
            return Err("帧数必须大于0".to_string());
        }
        if self.camera_fov <= 0.0 || self.camera_fov >= 180.0 {
            return Err(format!("视场角必须在(0, 180)度之间，得到 {}", self.camera_fov));
        }
        if self.near <= 0.0 || self.far <= self.near {
            return Err(format!(
                "裁剪平面必须满足 0 < near < far，得到 near={} far={}",
                self.near, self.far
            ));
        }
        parse_point3(&self.camera_from)?;
        parse_point3(&self.camera_at)?;
        parse_vec3(&self.camera_up)?;
        self.object_components()?;
        Ok(())
    }
}
