use ga4_mcp_core::CredentialRef;
use serde::Deserialize;
use std::fmt;

/// Auxiliary fields carried in a tool call's `kwargs` object, outside the
/// declared parameters.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SidebandCredentials {
    pub access_token: Option<String>,
    /// Identity hint, logged only.
    pub user_email: Option<String>,
}

impl SidebandCredentials {
    pub fn credential(&self) -> CredentialRef {
        CredentialRef::from_access_token(self.access_token.as_deref())
    }

    pub fn user_label(&self) -> &str {
        self.user_email
            .as_deref()
            .filter(|email| !email.is_empty())
            .unwrap_or("anonymous")
    }
}

impl fmt::Debug for SidebandCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidebandCredentials")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("user_email", &self.user_email)
            .finish()
    }
}
