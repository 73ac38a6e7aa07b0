use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Duration;

use super::types::{
    CreditsResponse, ImageJobRequest, StatusResponse, SubmitResponse, VideoJobRequest,
};
use super::{JobApi, JobPoll, PollPlan, TaskId};
use crate::config::ImageModel;
use crate::error::{GenerationError, MediaKind, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.kie.ai/api/v1";

/// Image jobs resolve in ~1-3 min; poll every 3s, give up after ~5 min.
const IMAGE_POLL: PollPlan = PollPlan {
    interval: Duration::from_secs(3),
    max_attempts: 100,
};

/// Videos take longer; poll every 5s, give up after ~10 min.
const VIDEO_POLL: PollPlan = PollPlan {
    interval: Duration::from_secs(5),
    max_attempts: 120,
};

static DRIVE_SHARE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://drive\.google\.com/file/d/([a-zA-Z0-9_-]+)")
        .expect("drive share-link pattern")
});

/// Rewrite a Google Drive share link into its direct-download form; any
/// other URL passes through unchanged.
pub fn direct_download_url(url: &str) -> String {
    match DRIVE_SHARE_LINK.captures(url) {
        Some(caps) => format!("https://drive.google.com/uc?export=download&id={}", &caps[1]),
        None => url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Live backend — bearer-authenticated HTTP against the remote job API
// ---------------------------------------------------------------------------

pub struct LiveBackend {
    base_url: String,
    api_key: String,
    http: Client,
}

impl LiveBackend {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http: Client::new(),
        }
    }

    /// POST a job submit body and extract the task id.
    async fn submit<T: Serialize>(&self, url: &str, body: &T, kind: MediaKind) -> Result<TaskId> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Request { kind, status, body });
        }

        let parsed: SubmitResponse = resp.json().await?;
        parsed
            .data
            .and_then(|d| d.task_id)
            .ok_or(GenerationError::MissingTaskId(kind))
    }

    /// GET a job status record. A non-success HTTP status is transient from
    /// the protocol's point of view, so it maps to `Pending` rather than an
    /// error; success requires flag 1 AND at least one result URL.
    async fn poll_status(&self, endpoint_prefix: &str, task_id: &str) -> Result<JobPoll> {
        let url = format!(
            "{}/{}/record-info?taskId={}",
            self.base_url, endpoint_prefix, task_id
        );
        let resp = self.http.get(&url).bearer_auth(&self.api_key).send().await?;

        if !resp.status().is_success() {
            return Ok(JobPoll::Pending);
        }

        let parsed: StatusResponse = resp.json().await?;
        let ready = parsed
            .data
            .filter(|d| d.success_flag == 1)
            .and_then(|d| d.response)
            .and_then(|r| r.result_urls.into_iter().next());

        Ok(match ready {
            Some(url) => JobPoll::Ready(url),
            None => JobPoll::Pending,
        })
    }
}

#[async_trait]
impl JobApi for LiveBackend {
    async fn submit_image_job(&self, req: &ImageJobRequest, model: ImageModel) -> Result<TaskId> {
        let body = ImageJobRequest {
            files_url: req.files_url.iter().map(|u| direct_download_url(u)).collect(),
            prompt: req.prompt.clone(),
            size: req.size.clone(),
            n_variants: req.n_variants,
        };
        let url = format!("{}/{}/generate", self.base_url, model.endpoint_prefix());
        self.submit(&url, &body, MediaKind::Image).await
    }

    async fn poll_image_job(&self, task_id: &str, model: ImageModel) -> Result<JobPoll> {
        self.poll_status(model.endpoint_prefix(), task_id).await
    }

    async fn submit_video_job(&self, req: &VideoJobRequest) -> Result<TaskId> {
        let url = format!("{}/veo/generate", self.base_url);
        self.submit(&url, req, MediaKind::Video).await
    }

    async fn poll_video_job(&self, task_id: &str) -> Result<JobPoll> {
        self.poll_status("veo", task_id).await
    }

    async fn get_credits(&self) -> Result<u64> {
        let url = format!("{}/account/credits", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let parsed: CreditsResponse = resp.json().await?;
        Ok(parsed.data.map(|d| d.credits).unwrap_or(0))
    }

    fn poll_plan(&self, kind: MediaKind) -> PollPlan {
        match kind {
            MediaKind::Image => IMAGE_POLL,
            MediaKind::Video => VIDEO_POLL,
        }
    }
}
