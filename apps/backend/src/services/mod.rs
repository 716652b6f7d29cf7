//! Domain services sitting between the routes and the database.

pub mod srs;

pub use srs::SrsService;
