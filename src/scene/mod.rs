pub mod mesh;
pub mod scene_object;
