use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Role claim from app-level metadata, consulted before the user-level one.
    #[serde(default)]
    pub app_role: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
}

impl Principal {
    /// The effective role claim: app-level metadata wins when present.
    pub fn role(&self) -> Option<&str> {
        self.app_role.as_deref().or(self.user_role.as_deref())
    }
}
