pub mod files;
pub mod generation;
pub mod health;
pub mod jobs;
