use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    pub image_base64: Option<String>,
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub attached_images: Vec<String>,
    pub history_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitRequest {
    #[serde(default)]
    pub style: String,
    pub prompt: Option<String>,
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    #[serde(default)]
    pub style_id: String,
    pub image_url: Option<String>,
    pub prompt_addon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub images: Vec<String>,
}
