pub mod driver;
pub mod match_state;
pub mod moves;
pub mod play;
pub mod serialization;
