use crate::scene::mesh::MeshBuffer;
use log::{info, warn};
use nalgebra::Vector3;
use std::path::Path;

/// 加载 OBJ 文件并展开为扁平三角形缓冲。
/// 所有模型的法线齐备时生成带法线记录（stride 9），否则退化为
/// 位置加颜色记录（stride 6），面法线交由管线推导。
pub fn load_obj_mesh<P: AsRef<Path>>(
    obj_path: P,
    default_color: Vector3<f32>,
) -> Result<MeshBuffer, String> {
    let obj_path_ref = obj_path.as_ref();
    info!("加载 OBJ 文件: {:?}", obj_path_ref);

    let load_options = tobj::LoadOptions {
        triangulate: true,  // 将所有面转换为三角形
        single_index: true, // 位置/法线合并为单一索引
        ignore_points: true,
        ignore_lines: true,
    };

    let (models, materials_result) = tobj::load_obj(obj_path_ref, &load_options)
        .map_err(|e| format!("加载OBJ文件失败 {:?}: {}", obj_path_ref, e))?;
    if models.is_empty() {
        return Err(format!("OBJ文件不包含任何模型: {:?}", obj_path_ref));
    }

    let materials = materials_result.unwrap_or_else(|e| {
        warn!("MTL文件加载失败，使用默认颜色: {}", e);
        Vec::new()
    });

    let has_normals = models
        .iter()
        .all(|m| !m.mesh.normals.is_empty() && m.mesh.normals.len() == m.mesh.positions.len());
    let stride = if has_normals { 9 } else { 6 };

    let mut data = Vec::new();
    let mut triangle_count = 0usize;
    for model in &models {
        let mesh = &model.mesh;
        let color = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .and_then(|mat| mat.diffuse)
            .map(|d| Vector3::new(d[0], d[1], d[2]))
            .unwrap_or(default_color);

        if mesh.indices.len() % 3 != 0 {
            return Err(format!(
                "模型 '{}' 的索引数量 {} 不是3的倍数",
                model.name,
                mesh.indices.len()
            ));
        }

        for &index in &mesh.indices {
            let i = index as usize;
            if i * 3 + 2 >= mesh.positions.len() {
                return Err(format!("模型 '{}' 包含越界的顶点索引 {}", model.name, i));
            }
            data.extend_from_slice(&mesh.positions[i * 3..i * 3 + 3]);
            data.extend_from_slice(&[color.x, color.y, color.z]);
            if has_normals {
                data.extend_from_slice(&mesh.normals[i * 3..i * 3 + 3]);
            }
        }
        triangle_count += mesh.indices.len() / 3;
    }

    info!(
        "OBJ加载完成: {} 个三角形, {}顶点法线",
        triangle_count,
        if has_normals { "带" } else { "无" }
    );
    MeshBuffer::new(data, stride, has_normals)
}
