//! Singleton page sections: hero, about and footer. The server merges a
//! partial document into each one, so every field has a default and
//! unknown members survive a round trip through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Hero ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub hero_image: HeroImage,
    #[serde(default)]
    pub cta_buttons: Vec<CtaButton>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub experience_label: String,
    #[serde(default)]
    pub size: ImageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    #[serde(default = "default_edge")]
    pub width: u32,
    #[serde(default = "default_edge")]
    pub height: u32,
}

fn default_edge() -> u32 {
    80
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize {
            width: default_edge(),
            height: default_edge(),
        }
    }
}

impl Default for HeroImage {
    fn default() -> Self {
        HeroImage {
            src: String::new(),
            alt: String::new(),
            experience_label: String::new(),
            size: ImageSize::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CtaButton {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub href: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── About ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct About {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub role: String,
    /// One entry per paragraph.
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub stats: Vec<AboutStat>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutStat {
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_image: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl About {
    /// Editor text areas: bio keeps every line, highlights drop blank ones.
    pub fn set_bio_text(&mut self, text: &str) {
        self.bio = text.split('\n').map(|l| l.to_string()).collect();
    }

    pub fn set_highlights_text(&mut self, text: &str) {
        self.highlights = text
            .split('\n')
            .filter(|h| !h.trim().is_empty())
            .map(|h| h.to_string())
            .collect();
    }
}

// ── Footer ────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(default)]
    pub brand: Brand,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub quick_links: Vec<NavLink>,
    #[serde(default)]
    pub bottom_bar: BottomBar,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottomBar {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub heart_icon: bool,
    #[serde(default)]
    pub links: Vec<NavLink>,
}
