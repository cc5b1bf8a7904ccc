pub mod config;
pub mod geo;
pub mod predict;
pub mod tracker;
pub mod web;
