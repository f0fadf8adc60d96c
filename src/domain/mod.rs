pub mod coord;
pub mod environment;
pub mod grid;
pub mod layout;
pub mod player;
