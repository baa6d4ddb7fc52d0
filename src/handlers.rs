// src/handlers.rs

pub mod auth;
pub mod companies;
pub mod employees;
pub mod products;
pub mod sharing;
