pub mod artifact;
pub mod comment;
pub mod config;
pub mod context;
pub mod error;
pub mod platform;
pub mod step;
pub mod tree;
