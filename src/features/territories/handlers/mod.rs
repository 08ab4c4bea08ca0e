mod territory_handler;

pub use territory_handler::*;
