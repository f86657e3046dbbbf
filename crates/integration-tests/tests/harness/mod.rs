#![allow(dead_code)]

pub mod config;
pub mod mock_model;
pub mod mock_storage;
pub mod server;
