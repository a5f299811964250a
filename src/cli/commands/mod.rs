pub mod config;
pub mod remote;
pub mod seed;
pub mod token;
pub mod tree;
