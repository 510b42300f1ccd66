pub mod auth;
pub mod project;
pub mod settings;
pub mod tool;
