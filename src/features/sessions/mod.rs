//! View sessions: one selection controller shared by the polygon map, tile
//! map and list views of a client.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/api/sessions` | open (optionally deep-linked) |
//! | GET | `/api/sessions/{id}` | snapshot of all views |
//! | POST | `/api/sessions/{id}/intents` | apply an intent or gesture |
//! | POST | `/api/sessions/{id}/token/reload` | retry the map token |
//! | GET | `/api/sessions/{id}/polygon-map.svg` | polygon map as SVG |
//! | DELETE | `/api/sessions/{id}` | close, cancelling the token request |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::SessionService;
pub use workers::SessionSweeper;
