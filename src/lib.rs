pub mod components;
pub mod config;
pub mod error;
pub mod markup;
pub mod shutdown;
pub mod startup;
pub mod utils;
