//! Map access token for the tile surface.
//!
//! The portal issues the token (`GET /api/map/token`) and every view session
//! consumes it through a [`MapTokenProvider`] backed by a [`TokenSource`].

pub mod dto;
pub mod handler;
pub mod provider;
pub mod routes;
pub mod source;

pub use provider::{MapTokenProvider, TokenState};
pub use source::{HttpTokenSource, TokenError, TokenSource};
