use serde::Deserialize;

/// Request body for profile edits. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
