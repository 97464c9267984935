#![doc = "The `agenda` library crate."]
#![doc = ""]
#![doc = "Token-authenticated CRUD API over users (`/usuarios`) and their tasks (`/tarefas`)."]
#![doc = "The binary (`main.rs`) loads the configuration, opens the store and serves"]
#![doc = "`routes::config` behind `auth::AuthMiddleware`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
