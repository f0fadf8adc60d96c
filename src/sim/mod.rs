pub mod event;
pub mod share;
pub mod step;
pub mod world;
