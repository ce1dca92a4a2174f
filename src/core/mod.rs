pub mod chat;
pub mod config;
pub mod navigation;
pub mod site_context;
pub mod strings;
pub mod tree;
pub mod types;
