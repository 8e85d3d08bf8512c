pub mod file;
pub mod misc;
pub mod process;
