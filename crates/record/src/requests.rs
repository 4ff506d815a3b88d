//! Outbound request bodies.

use serde::{Deserialize, Serialize};

/// Body of the token verification call to the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyTokenRequest {
    #[serde(rename = "Token")]
    pub token: String,
}

/// Body of the conversion call: the stored path, never the image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    #[serde(rename = "Path")]
    pub path: String,
}
