// Frameworks: runtime bootstrap, environment configuration and file storage.

pub mod config;
pub mod runtime;
pub mod settings_file;
