//! Engine module providing the main interface to the generation pipeline

mod builder;
mod engine;

pub use builder::EngineBuilder;
pub use engine::{Engine, EngineInfo};
