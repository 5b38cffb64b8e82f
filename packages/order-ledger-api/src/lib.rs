//! HTTP surface of the order intake service.
//!
//! Provides the customer order form, the admin dashboard and downloads,
//! password login with signed session cookies, and request routing.

pub mod auth;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod server;
