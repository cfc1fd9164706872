pub mod environment;
pub mod global_file;
pub mod patch_file;
