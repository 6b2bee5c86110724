//! Domain logic kept free of I/O so it can be tested without a database

pub mod analytics;
pub mod menu;
pub mod orders;
