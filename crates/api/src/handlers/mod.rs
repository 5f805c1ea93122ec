pub mod files;
pub mod generation;
pub mod jobs;
