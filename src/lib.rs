pub mod config;
pub mod core_types;
pub mod demand;
pub mod error;
pub mod optimizer;
pub mod oracle;
pub mod trace;
// cmd and reports belong to the binary (main.rs).
