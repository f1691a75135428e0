use crate::core::cache::{LruCache, PipelineKey, WorldGeometryKey};
use crate::core::frame_context::FrameContext;
use crate::core::pipeline::world_to_screen;
use crate::core::projection::ScreenTriangle;
use crate::core::world_transform::{transform_to_world, WorldGeometry};
use crate::io::render_settings::RenderSettings;
use crate::scene::scene_object::SceneObject;
use crate::sink::DrawSink;
use log::{debug, error, info};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// 跨帧累计的运行统计
#[derive(Debug, Default)]
pub struct RenderStats {
    pub tier1_hits: AtomicUsize,
    pub tier1_misses: AtomicUsize,
    pub tier2_hits: AtomicUsize,
    pub tier2_misses: AtomicUsize,
    pub failed_units: AtomicUsize,
    pub triangles_emitted: AtomicUsize,
}

impl RenderStats {
    pub fn summary(&self) -> String {
        format!(
            "一级缓存 {}命中/{}未命中, 二级缓存 {}命中/{}未命中, 失败单元 {}, 输出三角形 {}",
            self.tier1_hits.load(Ordering::Relaxed),
            self.tier1_misses.load(Ordering::Relaxed),
            self.tier2_hits.load(Ordering::Relaxed),
            self.tier2_misses.load(Ordering::Relaxed),
            self.failed_units.load(Ordering::Relaxed),
            self.triangles_emitted.load(Ordering::Relaxed),
        )
    }
}

/// 几何管线调度器：持有两级LRU缓存与有界线程池，
/// 按帧组织"开始帧 / 处理物体 / 排序输出"三段生命周期。
pub struct Renderer {
    tier1: Mutex<LruCache<PipelineKey, Vec<ScreenTriangle>>>,
    tier2: Mutex<LruCache<WorldGeometryKey, WorldGeometry>>,
    pool: rayon::ThreadPool,
    frame_triangles: Mutex<Vec<ScreenTriangle>>,
    context: Option<FrameContext>,
    pub stats: RenderStats,
    /// 测试注入：指定id的物体在处理时触发panic，用于验证单元失败隔离
    #[cfg(test)]
    fail_object_id: Option<u64>,
}

/// 锁中毒只可能由单元内部panic造成，数据仍然一致，恢复后继续使用
fn recover<'a, T>(lock: &'a Mutex<T>) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|e| e.into_inner())
}

impl Renderer {
    pub fn new(settings: &RenderSettings) -> Result<Self, String> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.num_threads)
            .build()
            .map_err(|e| format!("无法创建线程池: {e}"))?;
        info!(
            "渲染器初始化: 一级缓存容量 {}, 二级缓存容量 {}, 线程数 {}",
            settings.tier1_capacity,
            settings.tier2_capacity,
            pool.current_num_threads()
        );
        Ok(Self {
            tier1: Mutex::new(LruCache::new(settings.tier1_capacity)?),
            tier2: Mutex::new(LruCache::new(settings.tier2_capacity)?),
            pool,
            frame_triangles: Mutex::new(Vec::new()),
            context: None,
            stats: RenderStats::default(),
            #[cfg(test)]
            fail_object_id: None,
        })
    }

    /// 开始新的一帧：记录相机快照并清空上一帧的累积缓冲
    pub fn begin_frame(&mut self, context: FrameContext) {
        recover(&self.frame_triangles).clear();
        self.context = Some(context);
    }

    /// 并行处理一批物体，结果按提交顺序追加到帧缓冲。
    /// 单个物体内部panic只记为失败单元（视同剔除），不中断整帧。
    pub fn process_objects(&self, objects: &[SceneObject]) -> Result<(), String> {
        let ctx = self
            .context
            .as_ref()
            .ok_or_else(|| "必须先调用 begin_frame".to_string())?;

        let per_object: Vec<Option<Vec<ScreenTriangle>>> = self.pool.install(|| {
            objects
                .par_iter()
                .map(|object| {
                    match catch_unwind(AssertUnwindSafe(|| self.process_object(ctx, object))) {
                        Ok(triangles) => Some(triangles),
                        Err(_) => {
                            error!("物体 {} 处理失败，按剔除处理", object.id);
                            self.stats.failed_units.fetch_add(1, Ordering::Relaxed);
                            None
                        }
                    }
                })
                .collect()
        });

        let mut frame = recover(&self.frame_triangles);
        for triangles in per_object.into_iter().flatten() {
            frame.extend_from_slice(&triangles);
        }
        Ok(())
    }

    /// 单物体管线：一级缓存命中直接复用屏幕三角形，
    /// 未命中则经二级缓存取世界几何后走投影管线并回填。
    fn process_object(&self, ctx: &FrameContext, object: &SceneObject) -> Vec<ScreenTriangle> {
        #[cfg(test)]
        self.maybe_inject_failure(object.id);
        let key = PipelineKey::new(
            object.id,
            &object.transform.params(),
            &ctx.view_matrix,
            &ctx.projection_matrix,
            &ctx.camera_position,
            ctx.width,
            ctx.height,
            &ctx.flags,
        );
        if let Some(cached) = recover(&self.tier1).get(&key) {
            self.stats.tier1_hits.fetch_add(1, Ordering::Relaxed);
            return cached.as_ref().clone();
        }
        self.stats.tier1_misses.fetch_add(1, Ordering::Relaxed);

        let geometry = self.world_geometry(object);
        let triangles = world_to_screen(ctx, &geometry);
        recover(&self.tier1).insert(key, triangles.clone());
        triangles
    }

    /// 二级缓存的取或算。计算放在锁外，代价是并发未命中时
    /// 同一物体可能被重复计算一次，换取不跨计算持锁。
    fn world_geometry(&self, object: &SceneObject) -> std::sync::Arc<WorldGeometry> {
        let key = WorldGeometryKey::new(
            object.id,
            &object.transform.params(),
            object.mesh.has_normals(),
        );
        if let Some(cached) = recover(&self.tier2).get(&key) {
            self.stats.tier2_hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }
        self.stats.tier2_misses.fetch_add(1, Ordering::Relaxed);
        let geometry = transform_to_world(&object.mesh, &object.transform.model_matrix());
        recover(&self.tier2).insert(key, geometry)
    }

    /// 结束一帧：按需深度排序后由远到近交给输出端，返回绘制数量
    pub fn end_frame(&mut self, sink: &mut dyn DrawSink) -> Result<usize, String> {
        let ctx = self
            .context
            .take()
            .ok_or_else(|| "必须先调用 begin_frame".to_string())?;
        let mut triangles = std::mem::take(&mut *recover(&self.frame_triangles));
        if ctx.flags.sort_triangles {
            // 稳定排序，深度相同的三角形保持提交顺序
            triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        }
        for triangle in &triangles {
            sink.draw_triangle(triangle);
        }
        let count = triangles.len();
        self.stats
            .triangles_emitted
            .fetch_add(count, Ordering::Relaxed);
        debug!("本帧绘制三角形 {count} 个");
        Ok(count)
    }

    pub fn tier1_len(&self) -> usize {
        recover(&self.tier1).len()
    }

    pub fn tier2_len(&self) -> usize {
        recover(&self.tier2).len()
    }

    /// 清空两级缓存（网格内容原地变更后调用）
    pub fn invalidate_caches(&self) {
        recover(&self.tier1).clear();
        recover(&self.tier2).clear();
    }

    #[cfg(test)]
    fn maybe_inject_failure(&self, object_id: u64) {
        if self.fail_object_id == Some(object_id) {
            panic!("注入的单元失败: 物体 {object_id}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_context::RenderFlags;
    use crate::geometry::camera::Camera;
    use crate::scene::mesh::MeshBuffer;
    use crate::sink::CollectSink;
    use nalgebra::{Point3, Vector3};
    use std::sync::Arc;

    fn settings_with_threads(num_threads: usize) -> RenderSettings {
        RenderSettings {
            num_threads,
            ..RenderSettings::default()
        }
    }

    fn test_camera() -> Camera {
        Camera::new_perspective(
            Point3::new(0.0, 0.0, 4.0),
            Point3::origin(),
            Vector3::y(),
            60.0,
            1.0,
            0.1,
            100.0,
        )
    }

    fn cube_objects(count: u64) -> Vec<SceneObject> {
        let mesh = Arc::new(MeshBuffer::unit_cube());
        (0..count)
            .map(|i| {
                SceneObject::new(i + 1, Arc::clone(&mesh))
                    .with_position(Vector3::new(i as f32 * 2.0 - count as f32, 0.0, 0.0))
            })
            .collect()
    }

    fn render_once(renderer: &mut Renderer, objects: &[SceneObject]) -> Vec<ScreenTriangle> {
        let ctx = FrameContext::new(&test_camera(), 400, 400, RenderFlags::default());
        renderer.begin_frame(ctx);
        renderer.process_objects(objects).unwrap();
        let mut sink = CollectSink::default();
        renderer.end_frame(&mut sink).unwrap();
        sink.triangles
    }

    /// 深度为 z 的单三角形物体
    fn flat_object(id: u64, z: f32) -> SceneObject {
        let data = vec![
            -0.5, -0.5, 0.0, 0.5, 0.5, 0.5, //
            0.5, -0.5, 0.0, 0.5, 0.5, 0.5, //
            0.0, 0.5, 0.0, 0.5, 0.5, 0.5,
        ];
        let mesh = Arc::new(MeshBuffer::new(data, 6, false).unwrap());
        SceneObject::new(id, mesh).with_position(Vector3::new(0.0, 0.0, z))
    }

    #[test]
    fn process_without_begin_frame_is_an_error() {
        let renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        assert!(renderer.process_objects(&cube_objects(1)).is_err());
    }

    #[test]
    fn repeated_frame_hits_tier1() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        let objects = cube_objects(2);
        let first = render_once(&mut renderer, &objects);
        let second = render_once(&mut renderer, &objects);
        assert_eq!(first, second);
        assert_eq!(renderer.stats.tier1_misses.load(Ordering::Relaxed), 2);
        assert_eq!(renderer.stats.tier1_hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn camera_move_reuses_tier2_only() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        let objects = cube_objects(1);
        render_once(&mut renderer, &objects);

        let mut camera = test_camera();
        camera.orbit_y(15.0);
        let ctx = FrameContext::new(&camera, 400, 400, RenderFlags::default());
        renderer.begin_frame(ctx);
        renderer.process_objects(&objects).unwrap();
        let mut sink = CollectSink::default();
        renderer.end_frame(&mut sink).unwrap();

        // 相机动了：一级全未命中，二级命中
        assert_eq!(renderer.stats.tier1_hits.load(Ordering::Relaxed), 0);
        assert_eq!(renderer.stats.tier1_misses.load(Ordering::Relaxed), 2);
        assert_eq!(renderer.stats.tier2_hits.load(Ordering::Relaxed), 1);
        assert_eq!(renderer.stats.tier2_misses.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn transform_change_invalidates_both_tiers() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        let mut objects = cube_objects(1);
        render_once(&mut renderer, &objects);

        objects[0].transform.rotation_deg.y += 10.0;
        render_once(&mut renderer, &objects);

        assert_eq!(renderer.stats.tier1_hits.load(Ordering::Relaxed), 0);
        assert_eq!(renderer.stats.tier2_hits.load(Ordering::Relaxed), 0);
        assert_eq!(renderer.stats.tier2_misses.load(Ordering::Relaxed), 2);
        assert_eq!(renderer.tier2_len(), 2);
    }

    #[test]
    fn emits_farthest_first() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        // 相机在 z=4，深度 = 4 - z
        let objects = vec![flat_object(1, -1.0), flat_object(2, 3.0), flat_object(3, 1.0)];
        let triangles = render_once(&mut renderer, &objects);
        assert_eq!(triangles.len(), 3);
        let depths: Vec<f32> = triangles.iter().map(|t| t.depth).collect();
        assert!((depths[0] - 5.0).abs() < 1e-4);
        assert!((depths[1] - 3.0).abs() < 1e-4);
        assert!((depths[2] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn disabling_sort_keeps_submission_order() {
        let settings = settings_with_threads(1);
        let mut renderer = Renderer::new(&settings).unwrap();
        let objects = vec![flat_object(1, -1.0), flat_object(2, 3.0)];
        let flags = RenderFlags {
            sort_triangles: false,
            ..RenderFlags::default()
        };
        let ctx = FrameContext::new(&test_camera(), 400, 400, flags);
        renderer.begin_frame(ctx);
        renderer.process_objects(&objects).unwrap();
        let mut sink = CollectSink::default();
        renderer.end_frame(&mut sink).unwrap();
        // 未排序：近的物体1（深度5）仍排在前
        assert!((sink.triangles[0].depth - 5.0).abs() < 1e-4);
        assert!((sink.triangles[1].depth - 1.0).abs() < 1e-4);
    }

    #[test]
    fn sort_flag_change_misses_tier1() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        let objects = cube_objects(1);
        render_once(&mut renderer, &objects);

        // 仅翻转排序开关，其余输入不变：必须未命中一级缓存
        let flags = RenderFlags {
            sort_triangles: false,
            ..RenderFlags::default()
        };
        let ctx = FrameContext::new(&test_camera(), 400, 400, flags);
        renderer.begin_frame(ctx);
        renderer.process_objects(&objects).unwrap();
        let mut sink = CollectSink::default();
        renderer.end_frame(&mut sink).unwrap();

        assert_eq!(renderer.stats.tier1_hits.load(Ordering::Relaxed), 0);
        assert_eq!(renderer.stats.tier1_misses.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn panicking_unit_is_counted_and_frame_survives() {
        let mut renderer = Renderer::new(&settings_with_threads(2)).unwrap();
        renderer.fail_object_id = Some(2);
        let objects = vec![flat_object(1, -1.0), flat_object(2, 0.0), flat_object(3, 1.0)];
        let triangles = render_once(&mut renderer, &objects);

        // 物体2按剔除处理，其余物体照常输出
        assert_eq!(renderer.stats.failed_units.load(Ordering::Relaxed), 1);
        assert_eq!(triangles.len(), 2);
        let depths: Vec<f32> = triangles.iter().map(|t| t.depth).collect();
        assert!((depths[0] - 5.0).abs() < 1e-4);
        assert!((depths[1] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn output_is_independent_of_thread_count() {
        let mut single = Renderer::new(&settings_with_threads(1)).unwrap();
        let mut multi = Renderer::new(&settings_with_threads(8)).unwrap();
        let objects = cube_objects(6);
        assert_eq!(
            render_once(&mut single, &objects),
            render_once(&mut multi, &objects)
        );
    }

    #[test]
    fn tier1_eviction_respects_capacity() {
        let settings = RenderSettings {
            tier1_capacity: 2,
            num_threads: 1,
            ..RenderSettings::default()
        };
        let mut renderer = Renderer::new(&settings).unwrap();
        let objects = cube_objects(5);
        render_once(&mut renderer, &objects);
        assert_eq!(renderer.tier1_len(), 2);
    }

    #[test]
    fn invalidate_empties_both_caches() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        let objects = cube_objects(2);
        render_once(&mut renderer, &objects);
        assert!(renderer.tier1_len() > 0);
        renderer.invalidate_caches();
        assert_eq!(renderer.tier1_len(), 0);
        assert_eq!(renderer.tier2_len(), 0);
    }

    #[test]
    fn end_frame_returns_emitted_count() {
        let mut renderer = Renderer::new(&settings_with_threads(1)).unwrap();
        let ctx = FrameContext::new(&test_camera(), 400, 400, RenderFlags::default());
        renderer.begin_frame(ctx);
        renderer.process_objects(&[flat_object(1, 0.0)]).unwrap();
        let mut sink = CollectSink::default();
        assert_eq!(renderer.end_frame(&mut sink).unwrap(), 1);
    }
}
