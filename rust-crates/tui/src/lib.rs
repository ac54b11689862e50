pub mod app;
pub mod chain;
pub mod config;
pub mod share;
pub mod ui;
pub mod wallets;
