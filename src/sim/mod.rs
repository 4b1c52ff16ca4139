pub mod asset;
pub mod event;
pub mod provider;
pub mod reveal;
pub mod round;
pub mod scheduler;
pub mod step;
pub mod timer;
pub mod world;
