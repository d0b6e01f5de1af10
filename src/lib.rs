/*
 * Responsibility
 * - crate のモジュール構成 (binary: api-authorizer / user-admin から共有)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
