use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct EditBookmarkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}
