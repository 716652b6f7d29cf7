//! HTTP handlers. Each one parses input, calls `SrsService` and shapes
//! the response.

pub mod flashcards;
pub mod review;
pub mod settings;
pub mod stats;
