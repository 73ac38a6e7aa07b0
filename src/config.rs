use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GenerationError, Result};

// ---------------------------------------------------------------------------
// Valid values — single source of truth for the CLI shell AND any future UI
// ---------------------------------------------------------------------------

pub const MIN_SCENE_COUNT: usize = 1;
pub const MAX_SCENE_COUNT: usize = 12;

/// Dialogue is spoken by the generated actor; the video model trips over
/// hyphens and em dashes, so they are rejected up front.
pub const MAX_DIALOGUE_CHARS: usize = 200;
pub const FORBIDDEN_DIALOGUE_CHARS: [char; 2] = ['-', '—'];

// ---------------------------------------------------------------------------
// Model and aspect-ratio identifiers
// ---------------------------------------------------------------------------

/// Video generation model tier. `Veo3Fast` is the cheaper tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoModel {
    Veo3Fast,
    Veo3,
}

impl VideoModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoModel::Veo3Fast => "veo3_fast",
            VideoModel::Veo3 => "veo3",
        }
    }
}

impl FromStr for VideoModel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "veo3_fast" => Ok(VideoModel::Veo3Fast),
            "veo3" => Ok(VideoModel::Veo3),
            other => Err(GenerationError::Validation(format!(
                "invalid video model \"{other}\". Valid: veo3_fast, veo3"
            ))),
        }
    }
}

impl std::fmt::Display for VideoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image generation model variant. Each variant routes to its own endpoint
/// prefix on the remote API; the wire shape is identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageModel {
    #[default]
    Gpt4oImage,
    FluxKontext,
}

impl ImageModel {
    /// Path segment between the API base and `/generate` / `/record-info`.
    pub fn endpoint_prefix(&self) -> &'static str {
        match self {
            ImageModel::Gpt4oImage => "gpt4o-image",
            ImageModel::FluxKontext => "flux-kontext",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageModel::Gpt4oImage => "gpt4o_image",
            ImageModel::FluxKontext => "flux_kontext",
        }
    }
}

impl FromStr for ImageModel {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gpt4o_image" => Ok(ImageModel::Gpt4oImage),
            "flux_kontext" => Ok(ImageModel::FluxKontext),
            other => Err(GenerationError::Validation(format!(
                "invalid image model \"{other}\". Valid: gpt4o_image, flux_kontext"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageAspectRatio {
    #[serde(rename = "3:2")]
    Landscape,
    #[serde(rename = "2:3")]
    Portrait,
}

impl ImageAspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageAspectRatio::Landscape => "3:2",
            ImageAspectRatio::Portrait => "2:3",
        }
    }
}

impl FromStr for ImageAspectRatio {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3:2" => Ok(ImageAspectRatio::Landscape),
            "2:3" => Ok(ImageAspectRatio::Portrait),
            other => Err(GenerationError::Validation(format!(
                "invalid image aspect ratio \"{other}\". Valid: 3:2, 2:3"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoAspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl VideoAspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoAspectRatio::Landscape => "16:9",
            VideoAspectRatio::Portrait => "9:16",
        }
    }
}

impl FromStr for VideoAspectRatio {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "16:9" => Ok(VideoAspectRatio::Landscape),
            "9:16" => Ok(VideoAspectRatio::Portrait),
            other => Err(GenerationError::Validation(format!(
                "invalid video aspect ratio \"{other}\". Valid: 16:9, 9:16"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation configuration — immutable per batch
// ---------------------------------------------------------------------------

/// Everything a single generation batch needs. Collected by the shell,
/// validated at the boundary, then handed to the orchestrator read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Product reference image fed to every image job.
    pub reference_image: String,
    pub scene_count: usize,
    /// Dialogue for the single-scene case.
    pub dialogue: String,
    /// Per-scene dialogues, used when `scene_count > 1`.
    #[serde(default)]
    pub dialogues: Vec<String>,
    pub model: VideoModel,
    #[serde(default)]
    pub image_model: ImageModel,
    pub image_aspect_ratio: ImageAspectRatio,
    pub video_aspect_ratio: VideoAspectRatio,
    /// Free text, mined for setting keywords by the prompt builder.
    #[serde(default)]
    pub special_requests: String,
    /// Optional product/brand hint appended to scene actions.
    #[serde(default)]
    pub product_hint: String,
}

impl GenerationConfig {
    /// Boundary validation. Called by the shell before any orchestrator entry
    /// point; the core assumes a config that passed this check.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SCENE_COUNT..=MAX_SCENE_COUNT).contains(&self.scene_count) {
            return Err(GenerationError::Validation(format!(
                "scene count must be {MIN_SCENE_COUNT}-{MAX_SCENE_COUNT}, got {}",
                self.scene_count
            )));
        }
        if self.reference_image.trim().is_empty() {
            return Err(GenerationError::Validation(
                "a reference image URL is required".into(),
            ));
        }
        if self.scene_count > 1 && self.dialogues.len() != self.scene_count {
            return Err(GenerationError::Validation(format!(
                "expected {} dialogues for {} scenes, got {}",
                self.scene_count,
                self.scene_count,
                self.dialogues.len()
            )));
        }
        if self.scene_count == 1 {
            validate_dialogue(&self.dialogue)?;
        } else {
            for dialogue in &self.dialogues {
                validate_dialogue(dialogue)?;
            }
        }
        Ok(())
    }

    /// The dialogue the prompt builder should use for scene `index` (0-based).
    /// An empty result means "use the fallback line".
    pub fn dialogue_for_scene(&self, index: usize) -> &str {
        if self.scene_count == 1 {
            &self.dialogue
        } else {
            self.dialogues.get(index).map(String::as_str).unwrap_or("")
        }
    }
}

fn validate_dialogue(dialogue: &str) -> Result<()> {
    if dialogue.chars().count() > MAX_DIALOGUE_CHARS {
        return Err(GenerationError::Validation(format!(
            "dialogue must be {MAX_DIALOGUE_CHARS} characters or less"
        )));
    }
    if dialogue.contains(FORBIDDEN_DIALOGUE_CHARS) {
        return Err(GenerationError::Validation(
            "dialogue cannot contain hyphens or em dashes".into(),
        ));
    }
    Ok(())
}
