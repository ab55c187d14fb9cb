pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod model;
pub mod output;
pub mod pages;
pub mod panel;
pub mod remote;
pub mod render;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;
