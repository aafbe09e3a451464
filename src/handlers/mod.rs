pub mod accounts;
pub mod actions;
pub mod approval;
pub mod auth;
pub mod helpers;
pub mod middleware;
