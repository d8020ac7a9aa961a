//! REST host for the cascade workflow engine
//!
//! Persists workflow documents by identifier in SQLite and exposes the
//! save/get/delete/list/run API. The engine itself lives in
//! `cascade-engine`; this crate wires it to storage and HTTP.

pub mod api;
pub mod config;
pub mod db;
