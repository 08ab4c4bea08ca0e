pub mod map_token;
pub mod selection;
pub mod sessions;
pub mod territories;
pub mod views;
