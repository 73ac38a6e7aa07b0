use serde::{Deserialize, Serialize};

/// Progress of one generation stage (image or video) within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Idle,
    Working,
    Done,
    Error,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Idle => "idle",
            StageStatus::Working => "working",
            StageStatus::Done => "done",
            StageStatus::Error => "error",
        }
    }
}

/// Runtime progress record for one scene. Created all-idle when a batch
/// starts and mutated only by the orchestrator; the video stage never leaves
/// `idle` until the image stage is `done`, because the video job takes the
/// generated image as its reference frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// 1-based, matches the `scene_id` of the corresponding prompt.
    pub id: usize,
    pub image_status: StageStatus,
    pub video_status: StageStatus,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl Scene {
    pub fn idle(id: usize) -> Self {
        Self {
            id,
            image_status: StageStatus::Idle,
            video_status: StageStatus::Idle,
            image_url: None,
            video_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_scene_has_no_urls() {
        let scene = Scene::idle(4);
        assert_eq!(scene.id, 4);
        assert_eq!(scene.image_status, StageStatus::Idle);
        assert_eq!(scene.video_status, StageStatus::Idle);
        assert!(scene.image_url.is_none());
        assert!(scene.video_url.is_none());
    }

    #[test]
    fn scene_serializes_with_camel_case_keys_and_lowercase_statuses() {
        let mut scene = Scene::idle(1);
        scene.image_status = StageStatus::Done;
        scene.image_url = Some("https://cdn.example.com/a.png".into());

        let v = serde_json::to_value(&scene).unwrap();
        assert_eq!(v["imageStatus"], "done");
        assert_eq!(v["videoStatus"], "idle");
        assert_eq!(v["imageUrl"], "https://cdn.example.com/a.png");
        assert_eq!(v["videoUrl"], serde_json::Value::Null);
    }
}
