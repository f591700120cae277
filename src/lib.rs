//! Kiosk Speech - bilingual counter assistant
//!
//! Lets counter staff and a customer who speak different languages talk
//! through a hosted speech pipeline (recognition, translation, synthesis).

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod translator;
pub mod audio;
pub mod enquiry;
pub mod counter;
