/*
 * Responsibility
 * - crate の公開モジュール
 * - main.rs と tests/ の両方から Router を組み立てられるようにする
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
