// Command modules for CLI

/// Catalogue listing
pub mod designs;

/// Sweep execution and result export
pub mod run;
