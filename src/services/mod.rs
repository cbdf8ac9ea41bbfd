pub mod batch;
pub mod config;
pub mod encoding;
pub mod loader;
pub mod output;
pub mod qa;
pub mod substitute;
pub mod translate;
