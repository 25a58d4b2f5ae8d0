pub mod archive;
pub mod cli;
pub mod clients;
pub mod clock;
pub mod queue;
pub mod repositories;
pub mod services;
pub mod state;
