pub mod assets;
pub mod collision;
pub mod compute;
pub mod config;
pub mod controller;
pub mod dungeon;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod level;
pub mod logging;
pub mod registry;
pub mod shop;
pub mod spawn;
