use async_trait::async_trait;
use std::time::Duration;

use super::types::{ImageJobRequest, VideoJobRequest};
use super::{JobApi, JobPoll, PollPlan, TaskId};
use crate::config::ImageModel;
use crate::error::{MediaKind, Result};

/// Stable placeholder assets; only the query suffix varies per call so the
/// UI still treats every result as a fresh URL.
pub const MOCK_IMAGE_BASE_URL: &str =
    "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=600";
pub const MOCK_VIDEO_BASE_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

pub const MOCK_CREDIT_BALANCE: u64 = 25_000;

/// Offline backend: jobs "finish" after a fixed simulated delay, expressed
/// as a single-attempt poll plan so the shared polling loop stays in play.
pub struct MockBackend;

#[async_trait]
impl JobApi for MockBackend {
    async fn submit_image_job(&self, _req: &ImageJobRequest, _model: ImageModel) -> Result<TaskId> {
        Ok(format!("mock-image-{}", uuid::Uuid::new_v4()))
    }

    async fn poll_image_job(&self, _task_id: &str, _model: ImageModel) -> Result<JobPoll> {
        Ok(JobPoll::Ready(format!(
            "{MOCK_IMAGE_BASE_URL}&seed={:08x}",
            rand::random::<u32>()
        )))
    }

    async fn submit_video_job(&self, _req: &VideoJobRequest) -> Result<TaskId> {
        Ok(format!("mock-video-{}", uuid::Uuid::new_v4()))
    }

    async fn poll_video_job(&self, _task_id: &str) -> Result<JobPoll> {
        Ok(JobPoll::Ready(format!(
            "{MOCK_VIDEO_BASE_URL}?seed={:08x}",
            rand::random::<u32>()
        )))
    }

    async fn get_credits(&self) -> Result<u64> {
        Ok(MOCK_CREDIT_BALANCE)
    }

    fn poll_plan(&self, kind: MediaKind) -> PollPlan {
        match kind {
            // The interval IS the simulated generation time.
            MediaKind::Image => PollPlan {
                interval: Duration::from_secs(2),
                max_attempts: 1,
            },
            MediaKind::Video => PollPlan {
                interval: Duration::from_secs(3),
                max_attempts: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageAspectRatio, VideoAspectRatio, VideoModel};
    use crate::kie::MediaClient;

    #[tokio::test(start_paused = true)]
    async fn mock_image_returns_the_stable_placeholder_base() {
        let client = MediaClient::mock();
        let url = client
            .generate_image("prompt", &["ref".into()], ImageAspectRatio::Portrait, ImageModel::default())
            .await
            .unwrap();
        assert!(url.starts_with(MOCK_IMAGE_BASE_URL), "got: {url}");
    }

    #[tokio::test(start_paused = true)]
    async fn mock_video_returns_the_stable_placeholder_base() {
        let client = MediaClient::mock();
        let url = client
            .generate_video("prompt", VideoModel::Veo3Fast, VideoAspectRatio::Portrait, "img")
            .await
            .unwrap();
        assert!(url.starts_with(MOCK_VIDEO_BASE_URL), "got: {url}");
    }

    #[tokio::test(start_paused = true)]
    async fn mock_urls_differ_only_in_their_seed_suffix() {
        let client = MediaClient::mock();
        let a = client
            .generate_image("p", &[], ImageAspectRatio::Landscape, ImageModel::default())
            .await
            .unwrap();
        let b = client
            .generate_image("p", &[], ImageAspectRatio::Landscape, ImageModel::default())
            .await
            .unwrap();
        let base = |u: &str| u.rsplit_once("&seed=").map(|(b, _)| b.to_string()).unwrap();
        assert_eq!(base(&a), base(&b));
    }

    #[tokio::test]
    async fn mock_reports_a_fixed_credit_balance() {
        let client = MediaClient::mock();
        assert_eq!(client.get_credit_balance().await, MOCK_CREDIT_BALANCE);
    }
}
