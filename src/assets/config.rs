use serde::Serialize;
use serde::Deserialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub base_url: String,
    pub avatar_size: u32,
    pub render_scale: u32,
    pub overlay: bool,
}

impl Default for AssetConfig {

    fn default() -> Self {
        Self {
            base_url: String::from("https://crafatar.com"),
            avatar_size: 64,
            render_scale: 6,
            overlay: true,
        }
    }
}
