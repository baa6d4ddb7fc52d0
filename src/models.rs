pub mod auth;
pub mod company;
pub mod employee;
pub mod product;
pub mod sharing;
