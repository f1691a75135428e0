use crate::core::frame_context::RenderFlags;
use nalgebra::{Matrix4, Point3};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// 链表空索引标记
const NIL: usize = usize::MAX;

/// 槽位数组加侵入式双向索引链表实现的定容 LRU。
/// get 与 insert 均为 O(1)，容量满时淘汰最久未访问的条目；
/// 同一批插入的条目并列最旧时，先插入者先被淘汰。
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    capacity: usize,
}

struct Slot<K, V> {
    key: K,
    value: Arc<V>,
    prev: usize,
    next: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// 容量为 0 视为配置错误而非禁用缓存
    pub fn new(capacity: usize) -> Result<Self, String> {
        if capacity == 0 {
            return Err("LRU缓存容量必须大于0".to_string());
        }
        Ok(Self {
            map: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 命中时把条目移到链表头部并返回共享引用
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let index = *self.map.get(key)?;
        self.detach(index);
        self.push_front(index);
        Some(Arc::clone(&self.slots[index].value))
    }

    /// 写入条目并返回其共享引用；键已存在时覆盖旧值并刷新访问序
    pub fn insert(&mut self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if let Some(&index) = self.map.get(&key) {
            self.slots[index].value = Arc::clone(&value);
            self.detach(index);
            self.push_front(index);
            return value;
        }
        if self.map.len() >= self.capacity {
            self.evict_oldest();
        }
        let slot = Slot {
            key: key.clone(),
            value: Arc::clone(&value),
            prev: NIL,
            next: NIL,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        self.map.insert(key, index);
        self.push_front(index);
        value
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn evict_oldest(&mut self) {
        let tail = self.tail;
        if tail == NIL {
            return;
        }
        self.detach(tail);
        self.map.remove(&self.slots[tail].key);
        self.free.push(tail);
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else if self.head == index {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else if self.tail == index {
            self.tail = prev;
        }
        self.slots[index].prev = NIL;
        self.slots[index].next = NIL;
    }

    fn push_front(&mut self, index: usize) {
        self.slots[index].prev = NIL;
        self.slots[index].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = index;
        }
        self.head = index;
        if self.tail == NIL {
            self.tail = index;
        }
    }
}

/// f32 按位指纹。NaN 与 -0.0/+0.0 的位型差异会产生不同键，
/// 代价是偶发的多余重算而非错误命中。
fn f32_bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}

fn matrix_bits(m: &Matrix4<f32>) -> [u32; 16] {
    let mut bits = [0u32; 16];
    for (i, v) in m.iter().enumerate() {
        bits[i] = v.to_bits();
    }
    bits
}

/// 帧开关的缓存键表示，所有开关都参与键比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagBits {
    pub use_lighting: bool,
    pub backface_culling: bool,
    pub clip_test: bool,
    pub sort_triangles: bool,
    pub colorize: bool,
    pub cull_small_triangles: bool,
    pub min_area_bits: u32,
}

impl From<&RenderFlags> for FlagBits {
    fn from(flags: &RenderFlags) -> Self {
        Self {
            use_lighting: flags.use_lighting,
            backface_culling: flags.backface_culling,
            clip_test: flags.clip_test,
            sort_triangles: flags.sort_triangles,
            colorize: flags.colorize,
            cull_small_triangles: flags.cull_small_triangles,
            min_area_bits: flags.min_triangle_area.to_bits(),
        }
    }
}

/// 二级键：只依赖物体本身，与相机无关。
/// 相机移动时二级条目保持有效。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldGeometryKey {
    pub object_id: u64,
    pub transform_bits: [u32; 9],
    pub use_vertex_normals: bool,
}

impl WorldGeometryKey {
    pub fn new(object_id: u64, transform_params: &[f32; 9], use_vertex_normals: bool) -> Self {
        let mut transform_bits = [0u32; 9];
        for (i, v) in transform_params.iter().enumerate() {
            transform_bits[i] = v.to_bits();
        }
        Self {
            object_id,
            transform_bits,
            use_vertex_normals,
        }
    }
}

/// 一级键：物体参数加完整相机与视口状态。
/// 任一输入的任何一位变动都会产生新键。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub object_id: u64,
    pub transform_bits: [u32; 9],
    pub view_bits: [u32; 16],
    pub projection_bits: [u32; 16],
    pub camera_bits: [u32; 3],
    pub viewport: (u32, u32),
    pub flag_bits: FlagBits,
}

impl PipelineKey {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        object_id: u64,
        transform_params: &[f32; 9],
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
        camera_position: &Point3<f32>,
        width: usize,
        height: usize,
        flags: &RenderFlags,
    ) -> Self {
        let mut transform_bits = [0u32; 9];
        for (i, v) in transform_params.iter().enumerate() {
            transform_bits[i] = v.to_bits();
        }
        let camera = f32_bits(&[camera_position.x, camera_position.y, camera_position.z]);
        Self {
            object_id,
            transform_bits,
            view_bits: matrix_bits(view),
            projection_bits: matrix_bits(projection),
            camera_bits: [camera[0], camera[1], camera[2]],
            viewport: (width as u32, height as u32),
            flag_bits: FlagBits::from(flags),
        }
    }
}
