use crate::io::render_settings::RenderSettings;
use std::path::Path;
use toml::Value;

/// TOML配置管理器 - 统一处理所有配置的读写
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("读取配置文件失败: {}", e))?;

        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置
    pub fn load_from_content(content: &str) -> Result<RenderSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("解析TOML失败: {}", e))?;

        Self::parse_toml_to_settings(toml_value)
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(settings: &RenderSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings);
        std::fs::write(path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))
    }

    // ===== TOML -> RenderSettings 转换 =====

    fn parse_toml_to_settings(toml: Value) -> Result<RenderSettings, String> {
        let mut settings = RenderSettings::default();

        // [files] 部分
        if let Some(files) = toml.get("files").and_then(|v| v.as_table()) {
            Self::parse_files_section(&mut settings, files)?;
        }

        // [render] 部分
        if let Some(render) = toml.get("render").and_then(|v| v.as_table()) {
            Self::parse_render_section(&mut settings, render)?;
        }

        // [pipeline] 部分
        if let Some(pipeline) = toml.get("pipeline").and_then(|v| v.as_table()) {
            Self::parse_pipeline_section(&mut settings, pipeline)?;
        }

        // [cache] 部分
        if let Some(cache) = toml.get("cache").and_then(|v| v.as_table()) {
            Self::parse_cache_section(&mut settings, cache)?;
        }

        // [camera] 部分
        if let Some(camera) = toml.get("camera").and_then(|v| v.as_table()) {
            Self::parse_camera_section(&mut settings, camera)?;
        }

        // [animation] 部分
        if let Some(animation) = toml.get("animation").and_then(|v| v.as_table()) {
            Self::parse_animation_section(&mut settings, animation)?;
        }

        // [object] 部分
        if let Some(object) = toml.get("object").and_then(|v| v.as_table()) {
            Self::parse_object_section(&mut settings, object)?;
        }

        Ok(settings)
    }

    // ===== 各个section的解析方法 =====

    fn parse_files_section(
        settings: &mut RenderSettings,
        files: &toml::Table,
    ) -> Result<(), String> {
        if let Some(obj) = files.get("obj").and_then(|v| v.as_str()) {
            settings.obj = Some(obj.to_string());
        }
        if let Some(output) = files.get("output").and_then(|v| v.as_str()) {
            settings.output = output.to_string();
        }
        if let Some(output_dir) = files.get("output_dir").and_then(|v| v.as_str()) {
            settings.output_dir = output_dir.to_string();
        }
        Ok(())
    }

    fn parse_render_section(
        settings: &mut RenderSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = render.get("width").and_then(|v| v.as_integer()) {
            settings.width = width as usize;
        }
        if let Some(height) = render.get("height").and_then(|v| v.as_integer()) {
            settings.height = height as usize;
        }
        if let Some(colorize) = render.get("colorize").and_then(|v| v.as_bool()) {
            settings.colorize = colorize;
        }
        Ok(())
    }

    fn parse_pipeline_section(
        settings: &mut RenderSettings,
        pipeline: &toml::Table,
    ) -> Result<(), String> {
        if let Some(use_lighting) = pipeline.get("use_lighting").and_then(|v| v.as_bool()) {
            settings.use_lighting = use_lighting;
        }
        if let Some(backface_culling) = pipeline.get("backface_culling").and_then(|v| v.as_bool())
        {
            settings.backface_culling = backface_culling;
        }
        if let Some(clip_test) = pipeline.get("clip_test").and_then(|v| v.as_bool()) {
            settings.clip_test = clip_test;
        }
        if let Some(sort_triangles) = pipeline.get("sort_triangles").and_then(|v| v.as_bool()) {
            settings.sort_triangles = sort_triangles;
        }
        if let Some(cull_small_triangles) = pipeline
            .get("cull_small_triangles")
            .and_then(|v| v.as_bool())
        {
            settings.cull_small_triangles = cull_small_triangles;
        }
        if let Some(min_triangle_area) =
            pipeline.get("min_triangle_area").and_then(|v| v.as_float())
        {
            settings.min_triangle_area = min_triangle_area as f32;
        }
        Ok(())
    }

    fn parse_cache_section(
        settings: &mut RenderSettings,
        cache: &toml::Table,
    ) -> Result<(), String> {
        if let Some(tier1_capacity) = cache.get("tier1_capacity").and_then(|v| v.as_integer()) {
            settings.tier1_capacity = tier1_capacity as usize;
        }
        if let Some(tier2_capacity) = cache.get("tier2_capacity").and_then(|v| v.as_integer()) {
            settings.tier2_capacity = tier2_capacity as usize;
        }
        if let Some(num_threads) = cache.get("num_threads").and_then(|v| v.as_integer()) {
            settings.num_threads = num_threads as usize;
        }
        Ok(())
    }

    fn parse_camera_section(
        settings: &mut RenderSettings,
        camera: &toml::Table,
    ) -> Result<(), String> {
        if let Some(from) = camera.get("from").and_then(|v| v.as_str()) {
            settings.camera_from = from.to_string();
        }
        if let Some(at) = camera.get("at").and_then(|v| v.as_str()) {
            settings.camera_at = at.to_string();
        }
        if let Some(up) = camera.get("up").and_then(|v| v.as_str()) {
            settings.camera_up = up.to_string();
        }
        if let Some(fov) = camera.get("fov").and_then(|v| v.as_float()) {
            settings.camera_fov = fov as f32;
        }
        if let Some(near) = camera.get("near").and_then(|v| v.as_float()) {
            settings.near = near as f32;
        }
        if let Some(far) = camera.get("far").and_then(|v| v.as_float()) {
            settings.far = far as f32;
        }
        Ok(())
    }

    fn parse_animation_section(
        settings: &mut RenderSettings,
        animation: &toml::Table,
    ) -> Result<(), String> {
        if let Some(frames) = animation.get("frames").and_then(|v| v.as_integer()) {
            settings.frames = frames as usize;
        }
        if let Some(orbit) = animation
            .get("orbit_degrees_per_frame")
            .and_then(|v| v.as_float())
        {
            settings.orbit_degrees_per_frame = orbit as f32;
        }
        Ok(())
    }

    fn parse_object_section(
        settings: &mut RenderSettings,
        object: &toml::Table,
    ) -> Result<(), String> {
        if let Some(position) = object.get("position").and_then(|v| v.as_str()) {
            settings.object_position = position.to_string();
        }
        if let Some(rotation) = object.get("rotation").and_then(|v| v.as_str()) {
            settings.object_rotation = rotation.to_string();
        }
        if let Some(scale) = object.get("scale").and_then(|v| v.as_str()) {
            settings.object_scale = scale.to_string();
        }
        Ok(())
    }

    // ===== RenderSettings -> TOML 转换 =====

    fn settings_to_toml(settings: &RenderSettings) -> String {
        let mut content = String::new();

        // 文件头注释
        content.push_str("# 软件几何管线配置文件\n");
        content.push_str("# 基于RenderSettings默认值生成的示例配置\n\n");

        // [files] 部分
        content.push_str("[files]\n");
        if let Some(obj) = &settings.obj {
            content.push_str(&format!("obj = \"{}\"\n", obj));
        } else {
            content.push_str("# obj = \"path/to/model.obj\"  # 缺省使用内置立方体\n");
        }
        content.push_str(&format!("output = \"{}\"\n", settings.output));
        content.push_str(&format!("output_dir = \"{}\"\n", settings.output_dir));
        content.push('\n');

        // [render] 部分
        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!("colorize = {}\n", settings.colorize));
        content.push('\n');

        // [pipeline] 部分
        content.push_str("[pipeline]\n");
        content.push_str(&format!("use_lighting = {}\n", settings.use_lighting));
        content.push_str(&format!(
            "backface_culling = {}\n",
            settings.backface_culling
        ));
        content.push_str(&format!("clip_test = {}\n", settings.clip_test));
        content.push_str(&format!("sort_triangles = {}\n", settings.sort_triangles));
        content.push_str(&format!(
            "cull_small_triangles = {}\n",
            settings.cull_small_triangles
        ));
        content.push_str(&format!(
            "min_triangle_area = {}\n",
            settings.min_triangle_area
        ));
        content.push('\n');

        // [cache] 部分
        content.push_str("[cache]\n");
        content.push_str(&format!("tier1_capacity = {}\n", settings.tier1_capacity));
        content.push_str(&format!("tier2_capacity = {}\n", settings.tier2_capacity));
        content.push_str(&format!("num_threads = {}\n", settings.num_threads));
        content.push_str("# num_threads = 0 表示按CPU核数\n");
        content.push('\n');

        // [camera] 部分
        content.push_str("[camera]\n");
        content.push_str(&format!("from = \"{}\"\n", settings.camera_from));
        content.push_str(&format!("at = \"{}\"\n", settings.camera_at));
        content.push_str(&format!("up = \"{}\"\n", settings.camera_up));
        content.push_str(&format!("fov = {}\n", settings.camera_fov));
        content.push_str(&format!("near = {}\n", settings.near));
        content.push_str(&format!("far = {}\n", settings.far));
        content.push('\n');

        // [animation] 部分
        content.push_str("[animation]\n");
        content.push_str(&format!("frames = {}\n", settings.frames));
        content.push_str(&format!(
            "orbit_degrees_per_frame = {}\n",
            settings.orbit_degrees_per_frame
        ));
        content.push('\n');

        // [object] 部分
        content.push_str("[object]\n");
        content.push_str(&format!("position = \"{}\"\n", settings.object_position));
        content.push_str(&format!("rotation = \"{}\"\n", settings.object_rotation));
        content.push_str(&format!("scale = \"{}\"\n", settings.object_scale));

        content
    }
}
