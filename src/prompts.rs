use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::{GenerationConfig, ImageAspectRatio, VideoAspectRatio, VideoModel};

// ---------------------------------------------------------------------------
// Fixed vocabularies. The exact wording is the product's UGC aesthetic and
// must survive any refactor; rotation indices are what keep a batch visually
// diverse without repeats until a list wraps.
// ---------------------------------------------------------------------------

struct ActorDescriptor {
    gender: &'static str,
    ethnicity: &'static str,
    hair: &'static str,
    age: u8,
}

const ACTOR_DESCRIPTORS: [ActorDescriptor; 8] = [
    ActorDescriptor { gender: "woman", ethnicity: "Caucasian", hair: "blonde curly", age: 23 },
    ActorDescriptor { gender: "man", ethnicity: "Hispanic", hair: "dark short", age: 26 },
    ActorDescriptor { gender: "woman", ethnicity: "African American", hair: "natural textured", age: 24 },
    ActorDescriptor { gender: "man", ethnicity: "Asian", hair: "black styled", age: 27 },
    ActorDescriptor { gender: "woman", ethnicity: "Middle Eastern", hair: "long straight", age: 25 },
    ActorDescriptor { gender: "man", ethnicity: "Caucasian", hair: "brown wavy", age: 28 },
    ActorDescriptor { gender: "woman", ethnicity: "Latina", hair: "brown wavy", age: 22 },
    ActorDescriptor { gender: "man", ethnicity: "Mixed race", hair: "short fade", age: 29 },
];

const SCENE_SETTINGS: [&str; 8] = [
    "Modern kitchen with natural lighting",
    "Outdoor patio with golden hour lighting",
    "Cozy living room with warm ambient lighting",
    "Coffee shop with soft background lighting",
    "Car interior with natural daylight",
    "Bathroom mirror with overhead lighting",
    "Walking street with urban background",
    "Beach setting with natural sunlight",
];

/// Keywords mined from the special-requests text, in match order, each with
/// the canned setting it maps to.
const SETTING_KEYWORDS: [(&str, &str); 7] = [
    ("podcast", "Podcast recording setup with microphone"),
    ("car", "Car interior with dashboard visible"),
    ("mirror", "Bathroom mirror selfie with good lighting"),
    ("walking", "Walking outdoors with street background"),
    ("shades", "Outdoor setting wearing sunglasses"),
    ("beach", "Beach setting with ocean background"),
    ("street interview", "Urban street interview setting"),
];

const SCENE_ACTIONS: [&str; 6] = [
    "holding product and taking first sip",
    "examining product label with interest",
    "showing product to camera enthusiastically",
    "comparing with another product",
    "opening product packaging",
    "sharing product with friend",
];

const VIDEO_ACTIONS: [&str; 6] = [
    "taking first taste reaction",
    "explaining product benefits",
    "showing product features",
    "demonstrating product use",
    "sharing personal experience",
    "recommending to viewers",
];

const EMOTIONS: [&str; 6] = [
    "excited", "surprised", "delighted", "amazed", "thrilled", "pleased",
];

const IMAGE_CAMERA: &str =
    "Amateur mobile front camera, slightly off-center framing, casual handheld";
const IMAGE_STYLE: &str =
    "UGC realism, authentic imperfections, natural lighting, slightly blurry amateur quality";
const VIDEO_EMOTION: &str = "natural enthusiasm";
const VIDEO_CAMERA: &str = "Handheld phone video, natural movement, amateur mobile quality";

pub const FALLBACK_DIALOGUE: &str = "This is amazing... you have to try this!";

// ---------------------------------------------------------------------------
// Prompt structures — the JSON contract consumed by the orchestrator's
// prompt-string formatter and exported verbatim by `copyPromptsJSON`.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub emotion: String,
    pub action: String,
    pub character: String,
    pub setting: String,
    pub camera: String,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPrompt {
    pub dialogue: String,
    pub emotion: String,
    pub voice_type: String,
    pub action: String,
    pub character: String,
    pub setting: String,
    pub camera: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePrompt {
    /// 1-based scene identifier.
    pub scene_id: usize,
    pub image_prompt: ImagePrompt,
    pub video_prompt: VideoPrompt,
    pub aspect_ratio_image: ImageAspectRatio,
    pub aspect_ratio_video: VideoAspectRatio,
    pub model: VideoModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSet {
    pub scenes: Vec<ScenePrompt>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build one prompt per scene from the configuration. Deterministic except
/// for the emotion word, which is drawn uniformly from a fixed vocabulary.
pub fn build_prompts(config: &GenerationConfig) -> PromptSet {
    let matched_settings = extract_scene_hints(&config.special_requests);

    let scenes = (0..config.scene_count)
        .map(|i| {
            let actor = &ACTOR_DESCRIPTORS[i % ACTOR_DESCRIPTORS.len()];
            let setting = if matched_settings.is_empty() {
                SCENE_SETTINGS[i % SCENE_SETTINGS.len()]
            } else {
                matched_settings[i % matched_settings.len()]
            };

            let dialogue = match config.dialogue_for_scene(i) {
                "" => FALLBACK_DIALOGUE,
                d => d,
            };

            let mut image_action = SCENE_ACTIONS[i % SCENE_ACTIONS.len()].to_string();
            let mut video_action = VIDEO_ACTIONS[i % VIDEO_ACTIONS.len()].to_string();
            if !config.product_hint.is_empty() {
                image_action.push_str(&format!(", showing {}", config.product_hint));
                video_action.push_str(&format!(", featuring {}", config.product_hint));
            }

            ScenePrompt {
                scene_id: i + 1,
                image_prompt: ImagePrompt {
                    emotion: random_emotion().to_string(),
                    action: image_action,
                    character: format!(
                        "Young {}, {}, {} hair, {}, casual mobile selfie",
                        actor.gender, actor.age, actor.hair, actor.ethnicity
                    ),
                    setting: setting.to_string(),
                    camera: IMAGE_CAMERA.to_string(),
                    style: IMAGE_STYLE.to_string(),
                },
                video_prompt: VideoPrompt {
                    dialogue: dialogue.to_string(),
                    emotion: VIDEO_EMOTION.to_string(),
                    voice_type: format!(
                        "casual conversational {}",
                        if actor.gender == "woman" { "female" } else { "male" }
                    ),
                    action: video_action,
                    character: format!(
                        "Same as image - Young {}, {}, {}",
                        actor.gender, actor.age, actor.ethnicity
                    ),
                    setting: format!("Same as image - {setting}"),
                    camera: VIDEO_CAMERA.to_string(),
                },
                aspect_ratio_image: config.image_aspect_ratio,
                aspect_ratio_video: config.video_aspect_ratio,
                model: config.model,
            }
        })
        .collect();

    PromptSet { scenes }
}

/// Match fixed keywords against the special-requests text; matched settings
/// replace the generic rotation entirely.
fn extract_scene_hints(special_requests: &str) -> Vec<&'static str> {
    let requests = special_requests.to_lowercase();
    SETTING_KEYWORDS
        .iter()
        .filter(|(keyword, _)| requests.contains(keyword))
        .map(|(_, setting)| *setting)
        .collect()
}

fn random_emotion() -> &'static str {
    EMOTIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(EMOTIONS[0])
}
