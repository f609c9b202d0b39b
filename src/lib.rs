pub mod api;
pub mod client;
pub mod config;
pub mod dirs;
pub mod display;
pub mod filelock;
pub mod gateway;
pub mod logs;
pub mod menu;
pub mod session;
pub mod table;
