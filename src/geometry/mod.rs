pub mod camera;
pub mod transform;
