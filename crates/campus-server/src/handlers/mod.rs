pub mod handles;
pub mod me;
