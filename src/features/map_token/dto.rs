use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::map_token::provider::TokenState;

/// Payload of the token-issuing endpoint, `{ "token": string }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapTokenDto {
    pub token: String,
}

/// Token status as reported in a session snapshot. The token itself is
/// never echoed back; the tile view carries the resolved tile URL instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatusDto {
    /// One of `notRequested`, `loading`, `ready`, `error`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&TokenState> for TokenStatusDto {
    fn from(state: &TokenState) -> Self {
        Self {
            status: state.status().to_string(),
            error: match state {
                TokenState::Error(reason) => Some(reason.clone()),
                _ => None,
            },
        }
    }
}
