mod territory_dto;

pub use territory_dto::*;
