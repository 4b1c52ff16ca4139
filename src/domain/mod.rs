pub mod matcher;
pub mod normalize;
pub mod player;
pub mod scoring;
