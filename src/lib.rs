pub mod config;
pub mod deploy;
pub mod lambda;
pub mod package;
pub mod random;
pub mod runtime;
