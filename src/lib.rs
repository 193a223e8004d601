//! Bookstore application library
//!
//! Holds the service modules and the bootstrap sequence shared by the
//! `bookstore-app` binary and the CLI.

#![recursion_limit = "256"]

pub mod bootstrap;
pub mod modules;

pub use modules::books;
