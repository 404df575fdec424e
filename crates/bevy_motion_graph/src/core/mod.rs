pub mod animation_clip;
pub mod errors;
pub mod id;
pub mod motion_graph;
pub mod plugin;
pub mod pose;
pub mod skeleton;
