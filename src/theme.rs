use crate::ir::Gender;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub secondary_text_color: String,
    pub male_fill: String,
    pub male_border: String,
    pub female_fill: String,
    pub female_border: String,
    pub unknown_fill: String,
    pub unknown_border: String,
    pub focal_border: String,
    pub focal_glow: String,
    pub couple_edge_color: String,
    pub parent_edge_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Noto Sans KR\", \"Apple SD Gothic Neo\", sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFBEB".to_string(),
            text_color: "#1F2937".to_string(),
            secondary_text_color: "#6B7280".to_string(),
            male_fill: "#DBEAFE".to_string(),
            male_border: "#3B82F6".to_string(),
            female_fill: "#FCE7F3".to_string(),
            female_border: "#EC4899".to_string(),
            unknown_fill: "#F3F4F6".to_string(),
            unknown_border: "#9CA3AF".to_string(),
            focal_border: "#D97706".to_string(),
            focal_glow: "#FBBF24".to_string(),
            couple_edge_color: "#F59E0B".to_string(),
            parent_edge_color: "#92400E".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1C2430".to_string(),
            secondary_text_color: "#7A8AA6".to_string(),
            male_fill: "#F3F7FF".to_string(),
            male_border: "#7A9CD6".to_string(),
            female_fill: "#FFF4F8".to_string(),
            female_border: "#D68AAE".to_string(),
            unknown_fill: "#F8FAFF".to_string(),
            unknown_border: "#C7D2E5".to_string(),
            focal_border: "#1C2430".to_string(),
            focal_glow: "#D7E0F0".to_string(),
            couple_edge_color: "#B8A27A".to_string(),
            parent_edge_color: "#7A8AA6".to_string(),
        }
    }

    pub fn fill_for(&self, gender: Gender) -> &str {
        match gender {
            Gender::Male => &self.male_fill,
            Gender::Female => &self.female_fill,
            Gender::Unknown => &self.unknown_fill,
        }
    }

    pub fn border_for(&self, gender: Gender, focal: bool) -> &str {
        if focal {
            return &self.focal_border;
        }
        match gender {
            Gender::Male => &self.male_border,
            Gender::Female => &self.female_border,
            Gender::Unknown => &self.unknown_border,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
