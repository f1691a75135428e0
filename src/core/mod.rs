pub mod cache;
pub mod frame_context;
pub mod pipeline;
pub mod projection;
pub mod renderer;
pub mod visibility;
pub mod world_transform;
