pub mod access_service;
pub mod approval_service;
pub mod auth;
pub mod change_feed;
pub mod company_service;
pub mod constraint_evaluator;
pub mod product_service;
pub mod sharing_service;
