pub mod config;
pub mod loader;
pub mod scoreboard;
pub mod search;
pub mod submit;
pub mod util;
