use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::RenderSettings;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // ===== 基础设置 =====
    /// TOML配置文件路径，指定后其余命令行参数被忽略
    #[arg(long)]
    pub config: Option<String>,

    /// 输入OBJ文件的路径，缺省渲染内置立方体
    #[arg(long)]
    pub obj: Option<String>,

    // ===== 输出设置 =====
    /// 输出文件的基础名称（例如: "render" -> "render_000.png"）
    #[arg(short, long, default_value = "output")]
    pub output: String,

    /// 输出图像的目录
    #[arg(long, default_value = "output")]
    pub output_dir: String,

    /// 输出图像的宽度
    #[arg(long, default_value_t = 800)]
    pub width: usize,

    /// 输出图像的高度
    #[arg(long, default_value_t = 600)]
    pub height: usize,

    // ===== 管线设置 =====
    /// 启用光照计算
    #[arg(long, default_value_t = true)]
    pub use_lighting: bool,

    /// 启用背面剔除
    #[arg(long, default_value_t = true)]
    pub backface_culling: bool,

    /// 启用保守裁剪体测试
    #[arg(long, default_value_t = true)]
    pub clip_test: bool,

    /// 启用画家算法深度排序
    #[arg(long, default_value_t = true)]
    pub sort_triangles: bool,

    /// 使用伪随机面颜色而非顶点颜色
    #[arg(long, default_value_t = false)]
    pub colorize: bool,

    /// 启用小三角形剔除
    #[arg(long, default_value_t = false)]
    pub cull_small_triangles: bool,

    /// 小三角形剔除的最小面积阈值（平方像素）
    #[arg(long, default_value_t = 1.0)]
    pub min_triangle_area: f32,

    // ===== 缓存与并行 =====
    /// 一级缓存（屏幕三角形）容量
    #[arg(long, default_value_t = 64)]
    pub tier1_capacity: usize,

    /// 二级缓存（世界几何）容量
    #[arg(long, default_value_t = 64)]
    pub tier2_capacity: usize,

    /// 工作线程数，0表示按CPU核数
    #[arg(long, default_value_t = 0)]
    pub num_threads: usize,

    // ===== 相机参数 =====
    /// 相机位置（视点），格式为"x,y,z"
    #[arg(long, default_value = "0,0,3", allow_negative_numbers = true)]
    pub camera_from: String,

    /// 相机目标（观察点），格式为"x,y,z"
    #[arg(long, default_value = "0,0,0", allow_negative_numbers = true)]
    pub camera_at: String,

    /// 相机世界坐标系上方向，格式为"x,y,z"
    #[arg(long, default_value = "0,1,0", allow_negative_numbers = true)]
    pub camera_up: String,

    /// 相机垂直视场角（度）
    #[arg(long, default_value_t = 45.0)]
    pub camera_fov: f32,

    /// 近裁剪平面距离
    #[arg(long, default_value_t = 0.1)]
    pub near: f32,

    /// 远裁剪平面距离
    #[arg(long, default_value_t = 100.0)]
    pub far: f32,

    // ===== 动画参数 =====
    /// 渲染帧数
    #[arg(long, default_value_t = 1)]
    pub frames: usize,

    /// 每帧相机绕Y轴旋转角度（度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub orbit_degrees_per_frame: f32,

    // ===== 物体参数 =====
    /// 物体位置，格式为"x,y,z"
    #[arg(long, default_value = "0,0,0", allow_negative_numbers = true)]
    pub object_position: String,

    /// 物体欧拉角（度），格式为"x,y,z"
    #[arg(long, default_value = "0,0,0", allow_negative_numbers = true)]
    pub object_rotation: String,

    /// 物体非均匀缩放，格式为"x,y,z"
    #[arg(long, default_value = "1,1,1")]
    pub object_scale: String,
}

impl Args {
    /// 组装最终渲染设置。指定配置文件时以文件为准，否则取命令行参数。
    pub fn build_settings(&self) -> Result<RenderSettings, String> {
        if let Some(config) = &self.config {
            return TomlConfigLoader::load_from_file(config);
        }
        Ok(RenderSettings {
            obj: self.obj.clone(),
            output: self.output.clone(),
            output_dir: self.output_dir.clone(),
            width: self.width,
            height: self.height,
            use_lighting: self.use_lighting,
            backface_culling: self.backface_culling,
            clip_test: self.clip_test,
            sort_triangles: self.sort_triangles,
            colorize: self.colorize,
            cull_small_triangles: self.cull_small_triangles,
            min_triangle_area: self.min_triangle_area,
            tier1_capacity: self.tier1_capacity,
            tier2_capacity: self.tier2_capacity,
            num_threads: self.num_threads,
            camera_from: self.camera_from.clone(),
            camera_at: self.camera_at.clone(),
            camera_up: self.camera_up.clone(),
            camera_fov: self.camera_fov,
            near: self.near,
            far: self.far,
            frames: self.frames,
            orbit_degrees_per_frame: self.orbit_degrees_per_frame,
            object_position: self.object_position.clone(),
            object_rotation: self.object_rotation.clone(),
            object_scale: self.object_scale.clone(),
        })
    }
}
