// SQLite module - a synchronous rusqlite driver behind the connection traits
//
// - config: open options and their fluent builder
// - connection: `DatabaseConnection` and the statement/prepared handles
// - values: conversion between gateway values and rusqlite values, row buffering

pub mod config;
pub mod connection;
pub mod values;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
