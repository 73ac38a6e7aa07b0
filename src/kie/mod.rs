#[allow(dead_code)]
pub mod types;

pub mod live;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ImageAspectRatio, ImageModel, VideoAspectRatio, VideoModel};
use crate::error::{GenerationError, MediaKind, Result};
use types::{ImageJobRequest, VideoJobRequest};

/// Opaque identifier of one asynchronous remote job.
pub type TaskId = String;

/// One answer from a job status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPoll {
    Pending,
    /// The job finished; carries the first result URL.
    Ready(String),
}

/// Fixed-interval polling parameters for one media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPlan {
    pub interval: Duration,
    pub max_attempts: u32,
}

// ---------------------------------------------------------------------------
// Capability interface — live and mock variants, chosen once at construction
// ---------------------------------------------------------------------------

#[async_trait]
pub trait JobApi: Send + Sync {
    async fn submit_image_job(&self, req: &ImageJobRequest, model: ImageModel) -> Result<TaskId>;
    async fn poll_image_job(&self, task_id: &str, model: ImageModel) -> Result<JobPoll>;
    async fn submit_video_job(&self, req: &VideoJobRequest) -> Result<TaskId>;
    async fn poll_video_job(&self, task_id: &str) -> Result<JobPoll>;
    async fn get_credits(&self) -> Result<u64>;
    /// Polling cadence for this backend. The mock expresses its simulated
    /// generation delay as a single-attempt plan.
    fn poll_plan(&self, kind: MediaKind) -> PollPlan;
}

// ---------------------------------------------------------------------------
// Cost estimation — static arithmetic, no network
// ---------------------------------------------------------------------------

pub const IMAGE_CREDITS_PER_SCENE: u32 = 50;
pub const VIDEO_CREDITS_PER_SCENE_FAST: u32 = 80;
pub const VIDEO_CREDITS_PER_SCENE_QUALITY: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimatedCosts {
    pub image: u32,
    pub video: u32,
    pub total: u32,
}

// ---------------------------------------------------------------------------
// Client facade
// ---------------------------------------------------------------------------

/// Media generation client. Owns the submit-then-poll flow; the backend
/// decides where submits go and how status queries are answered.
pub struct MediaClient {
    backend: Box<dyn JobApi>,
}

impl MediaClient {
    /// Client against the remote job API.
    pub fn live(base_url: String, api_key: String) -> Self {
        Self {
            backend: Box::new(live::LiveBackend::new(base_url, api_key)),
        }
    }

    /// Client that fabricates results locally, for demos and offline use.
    pub fn mock() -> Self {
        Self {
            backend: Box::new(mock::MockBackend),
        }
    }

    /// Client over an arbitrary backend (test seam).
    pub fn with_backend(backend: Box<dyn JobApi>) -> Self {
        Self { backend }
    }

    /// Submit an image job and poll until the result URL is available.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference_image_urls: &[String],
        size: ImageAspectRatio,
        model: ImageModel,
    ) -> Result<String> {
        let req = ImageJobRequest {
            files_url: reference_image_urls.to_vec(),
            prompt: prompt.to_string(),
            size: size.as_str().to_string(),
            n_variants: 1,
        };
        let task_id = self.backend.submit_image_job(&req, model).await?;
        info!(task_id = %task_id, "image job submitted");

        let plan = self.backend.poll_plan(MediaKind::Image);
        poll_until_ready(MediaKind::Image, &plan, || {
            self.backend.poll_image_job(&task_id, model)
        })
        .await
    }

    /// Submit a video job (with the generated image as its reference frame)
    /// and poll until the result URL is available.
    pub async fn generate_video(
        &self,
        prompt: &str,
        model: VideoModel,
        aspect_ratio: VideoAspectRatio,
        source_image_url: &str,
    ) -> Result<String> {
        let req = VideoJobRequest {
            prompt: prompt.to_string(),
            model: model.as_str().to_string(),
            aspect_ratio: aspect_ratio.as_str().to_string(),
            image_urls: vec![source_image_url.to_string()],
            enable_fallback: true,
        };
        let task_id = self.backend.submit_video_job(&req).await?;
        info!(task_id = %task_id, "video job submitted");

        let plan = self.backend.poll_plan(MediaKind::Video);
        poll_until_ready(MediaKind::Video, &plan, || {
            self.backend.poll_video_job(&task_id)
        })
        .await
    }

    /// Current account credit balance; any failure is absorbed to 0.
    pub async fn get_credit_balance(&self) -> u64 {
        match self.backend.get_credits().await {
            Ok(credits) => credits,
            Err(e) => {
                warn!("credit balance fetch failed: {e}");
                0
            }
        }
    }

    /// Estimated credit cost of a batch. Flat per-scene image cost; the
    /// per-scene video cost depends on the model tier.
    pub fn estimated_costs(scene_count: usize, model: VideoModel) -> EstimatedCosts {
        let per_video = match model {
            VideoModel::Veo3Fast => VIDEO_CREDITS_PER_SCENE_FAST,
            VideoModel::Veo3 => VIDEO_CREDITS_PER_SCENE_QUALITY,
        };
        let image = IMAGE_CREDITS_PER_SCENE * scene_count as u32;
        let video = per_video * scene_count as u32;
        EstimatedCosts {
            image,
            video,
            total: image + video,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared polling protocol: wait, then query; transient failures retry
// ---------------------------------------------------------------------------

async fn poll_until_ready<F, Fut>(kind: MediaKind, plan: &PollPlan, mut poll_once: F) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<JobPoll>>,
{
    for attempt in 1..=plan.max_attempts {
        tokio::time::sleep(plan.interval).await;
        match poll_once().await {
            Ok(JobPoll::Ready(url)) => {
                info!(%kind, attempt, "job finished: {url}");
                return Ok(url);
            }
            Ok(JobPoll::Pending) => {
                debug!(%kind, attempt, "job still pending");
            }
            // Network hiccups and non-2xx status queries are transient;
            // only the attempt cap ends the loop.
            Err(e) => {
                warn!(%kind, attempt, "transient poll failure: {e}");
            }
        }
    }
    Err(GenerationError::Timeout {
        kind,
        attempts: plan.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    // -- cost estimator ----------------------------------------------------

    #[test]
    fn three_scenes_on_the_fast_tier_cost_390() {
        let costs = MediaClient::estimated_costs(3, VideoModel::Veo3Fast);
        assert_eq!(costs.image, 150);
        assert_eq!(costs.video, 240);
        assert_eq!(costs.total, 390);
    }

    #[test]
    fn three_scenes_on_the_quality_tier_cost_1350() {
        let costs = MediaClient::estimated_costs(3, VideoModel::Veo3);
        assert_eq!(costs.image, 150);
        assert_eq!(costs.video, 1200);
        assert_eq!(costs.total, 1350);
    }

    #[test]
    fn costs_scale_linearly_with_scene_count() {
        let one = MediaClient::estimated_costs(1, VideoModel::Veo3Fast);
        let twelve = MediaClient::estimated_costs(12, VideoModel::Veo3Fast);
        assert_eq!(twelve.total, one.total * 12);
    }

    // -- polling protocol --------------------------------------------------

    fn fast_plan(max_attempts: u32) -> PollPlan {
        PollPlan {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn returns_first_url_once_ready_and_stops_polling() {
        let calls = AtomicU32::new(0);
        let result = poll_until_ready(MediaKind::Image, &fast_plan(100), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n <= 5 {
                    Ok(JobPoll::Pending)
                } else {
                    Ok(JobPoll::Ready("https://cdn.example.com/out.png".into()))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "https://cdn.example.com/out.png");
        // Five pending answers, then the ready one; nothing after that.
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn transient_failures_do_not_end_the_loop() {
        let calls = AtomicU32::new(0);
        let result = poll_until_ready(MediaKind::Video, &fast_plan(10), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 4 {
                    Err(GenerationError::Validation("connection reset".into()))
                } else {
                    Ok(JobPoll::Ready("https://cdn.example.com/out.mp4".into()))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "https://cdn.example.com/out.mp4");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn image_poll_times_out_after_exactly_the_attempt_cap() {
        let calls = AtomicU32::new(0);
        let plan = fast_plan(100);
        let err = poll_until_ready(MediaKind::Image, &plan, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(JobPoll::Pending) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 100);
        match err {
            GenerationError::Timeout { kind, attempts } => {
                assert_eq!(kind, MediaKind::Image);
                assert_eq!(attempts, 100);
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn video_poll_times_out_after_exactly_the_attempt_cap() {
        let calls = AtomicU32::new(0);
        let plan = fast_plan(120);
        let err = poll_until_ready(MediaKind::Video, &plan, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(JobPoll::Pending) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 120);
        assert!(matches!(
            err,
            GenerationError::Timeout {
                kind: MediaKind::Video,
                attempts: 120
            }
        ));
    }

    #[tokio::test]
    async fn success_flag_without_url_keeps_polling() {
        // Mirrors a status endpoint that reports success before the result
        // URL is populated: Ready is only produced once a URL exists, so the
        // backend answers Pending and the loop keeps going.
        let calls = AtomicU32::new(0);
        let err = poll_until_ready(MediaKind::Image, &fast_plan(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(JobPoll::Pending) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, GenerationError::Timeout { .. }));
    }
}
