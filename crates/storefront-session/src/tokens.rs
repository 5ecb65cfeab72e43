//! Token pair model
//!
//! The backend issues a pair on sign-in and on every successful refresh.
//! Wire field names are camelCase to match the JSON API.

use serde::{Deserialize, Serialize};

/// A complete access/refresh token pair as issued by the backend.
///
/// The access token is short-lived and sent as a bearer credential on every
/// protected request; the refresh token is exchanged for a new pair when the
/// access token expires. Either half may also exist alone in the store (for
/// example after a partial clear), which the session surfaces as two
/// independent optionals rather than through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_wire_format() {
        let json = r#"{"accessToken":"at_abc","refreshToken":"rt_def"}"#;
        let pair: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.access_token, "at_abc");
        assert_eq!(pair.refresh_token, "rt_def");
    }

    #[test]
    fn serializes_camel_case_wire_format() {
        let pair = TokenPair::new("at_abc", "rt_def");
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("\"accessToken\":\"at_abc\""));
        assert!(json.contains("\"refreshToken\":\"rt_def\""));
    }

    #[test]
    fn rejects_snake_case_field_names() {
        let json = r#"{"access_token":"at","refresh_token":"rt"}"#;
        assert!(serde_json::from_str::<TokenPair>(json).is_err());
    }
}
