use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::kie::MediaClient;
use crate::prompts::{build_prompts, ImagePrompt, ScenePrompt, VideoPrompt};
use crate::scene::{Scene, StageStatus};
use crate::store::{GenerationState, GenerationStore, StatePatch};

/// Callback invoked once per batch, after every scene has resolved
/// (successfully or not) and the in-flight flag has cleared.
pub type BatchCallback = Arc<dyn Fn(&GenerationState) + Send + Sync>;

// ---------------------------------------------------------------------------
// Prompt-string formatting — field order is part of the provider contract
// ---------------------------------------------------------------------------

pub fn format_image_prompt(p: &ImagePrompt) -> String {
    format!(
        "{}, {}, {}, {}, {}, {}",
        p.emotion, p.action, p.character, p.setting, p.camera, p.style
    )
}

pub fn format_video_prompt(p: &VideoPrompt) -> String {
    format!(
        "{} - {}, {}, {}, {}, {}, {}",
        p.dialogue, p.emotion, p.voice_type, p.action, p.character, p.setting, p.camera
    )
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives a generation batch: one image job then one video job per scene,
/// strictly in scene order, writing progress into the shared store as it
/// goes. One failed scene never stops the rest of the batch.
pub struct Generator {
    store: Arc<GenerationStore>,
    client: MediaClient,
    on_batch_complete: Option<BatchCallback>,
}

impl Generator {
    pub fn new(store: Arc<GenerationStore>, client: MediaClient) -> Self {
        Self {
            store,
            client,
            on_batch_complete: None,
        }
    }

    /// Register a callback fired when a batch finishes (headless shells use
    /// this instead of watching the store).
    pub fn set_on_batch_complete(&mut self, callback: BatchCallback) {
        self.on_batch_complete = Some(callback);
    }

    pub fn store(&self) -> &Arc<GenerationStore> {
        &self.store
    }

    pub fn is_generating(&self) -> bool {
        self.store.is_generating()
    }

    /// Run one batch. A call while a batch is already in flight is a silent
    /// no-op; the running batch is never cancelled.
    pub async fn generate_scenes(&self, config: &GenerationConfig) {
        if !self.store.try_begin_batch() {
            debug!("generation already in flight, ignoring request");
            return;
        }

        let batch_id = uuid::Uuid::new_v4();
        info!(batch = %batch_id, scenes = config.scene_count, model = %config.model, "starting generation batch");

        let prompts = build_prompts(config);
        let scenes: Vec<Scene> = (1..=config.scene_count).map(Scene::idle).collect();
        self.store.apply(StatePatch {
            scenes: Some(scenes),
            prompts: Some(Some(prompts.clone())),
            scene_count: Some(config.scene_count),
            started_at: Some(Some(chrono::Utc::now().to_rfc3339())),
            finished_at: Some(None),
            ..Default::default()
        });

        // Strictly sequential: scene N fully resolves before N+1 starts. The
        // video stage consumes the image stage's output, and the remote API
        // is rate-limited, so scenes are never processed concurrently.
        for (index, scene_prompt) in prompts.scenes.iter().enumerate() {
            self.process_scene(index, scene_prompt, config).await;
        }

        self.store.apply(StatePatch {
            is_generating: Some(false),
            finished_at: Some(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        });
        info!(batch = %batch_id, "generation batch finished");

        // Unconditional: per-scene statuses carry the failure detail.
        if let Some(callback) = &self.on_batch_complete {
            callback(&self.store.snapshot());
        }
    }

    /// Rebuild prompts from the configuration and serialize them, without
    /// touching any run state.
    pub fn copy_prompts_json(&self, config: &GenerationConfig) -> Result<String> {
        let prompts = build_prompts(config);
        Ok(serde_json::to_string_pretty(&prompts)?)
    }

    /// Fetch the account credit balance into the store. Failures surface as
    /// a balance of 0, never as an error.
    pub async fn refresh_credits(&self) -> u64 {
        let balance = self.client.get_credit_balance().await;
        self.store.apply(StatePatch {
            credit_balance: Some(balance),
            ..Default::default()
        });
        balance
    }

    // -----------------------------------------------------------------------
    // Per-scene pipeline: image, then video from that image
    // -----------------------------------------------------------------------

    async fn process_scene(&self, index: usize, prompt: &ScenePrompt, config: &GenerationConfig) {
        let scene_id = prompt.scene_id;

        self.store
            .update_scene(index, |s| s.image_status = StageStatus::Working);

        let image_url = match self
            .client
            .generate_image(
                &format_image_prompt(&prompt.image_prompt),
                std::slice::from_ref(&config.reference_image),
                prompt.aspect_ratio_image,
                config.image_model,
            )
            .await
        {
            Ok(url) => url,
            Err(e) => {
                error!(scene = scene_id, "image stage failed: {e}");
                self.store
                    .update_scene(index, |s| s.image_status = StageStatus::Error);
                // The video stage never started; it stays idle.
                return;
            }
        };

        info!(scene = scene_id, "image ready");
        self.store.update_scene(index, |s| {
            s.image_status = StageStatus::Done;
            s.image_url = Some(image_url.clone());
        });

        self.store
            .update_scene(index, |s| s.video_status = StageStatus::Working);

        match self
            .client
            .generate_video(
                &format_video_prompt(&prompt.video_prompt),
                prompt.model,
                prompt.aspect_ratio_video,
                &image_url,
            )
            .await
        {
            Ok(url) => {
                info!(scene = scene_id, "video ready");
                self.store.update_scene(index, |s| {
                    s.video_status = StageStatus::Done;
                    s.video_url = Some(url);
                });
            }
            Err(e) => {
                error!(scene = scene_id, "video stage failed: {e}");
                self.store
                    .update_scene(index, |s| s.video_status = StageStatus::Error);
            }
        }
    }
}
