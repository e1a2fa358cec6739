pub mod assets;
pub mod camera;
pub mod collision;
pub mod compute;
pub mod config;
pub mod encounter;
pub mod entities;
pub mod error;
pub mod input;
pub mod level;
pub mod physics;
pub mod player;
pub mod render;
pub mod scheduler;
