use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Image generation — async job pattern
// POST {baseURL}/{image-endpoint}/generate            → task id
// GET  {baseURL}/{image-endpoint}/record-info?taskId= → status + result URLs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageJobRequest {
    /// Reference image URLs (share links already rewritten to direct form).
    pub files_url: Vec<String>,
    pub prompt: String,
    /// Aspect-ratio string, e.g. "2:3".
    pub size: String,
    /// Always 1 — one variant per scene.
    pub n_variants: u32,
}

// ---------------------------------------------------------------------------
// Video generation
// POST {baseURL}/veo/generate            → task id
// GET  {baseURL}/veo/record-info?taskId= → status + result URLs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoJobRequest {
    pub prompt: String,
    pub model: String,
    pub aspect_ratio: String,
    /// The generated scene image, sole reference frame.
    pub image_urls: Vec<String>,
    /// Always true — let the provider degrade gracefully under load.
    pub enable_fallback: bool,
}

// ---------------------------------------------------------------------------
// Shared response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub code: i64,
    pub data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitData {
    pub task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub code: i64,
    pub data: Option<StatusData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
    /// 1 once the job has finished successfully.
    #[serde(default)]
    pub success_flag: i64,
    pub response: Option<StatusPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    #[serde(default)]
    pub result_urls: Vec<String>,
}

// ---------------------------------------------------------------------------
// Account
// GET {baseURL}/account/credits
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreditsResponse {
    pub data: Option<CreditsData>,
}

#[derive(Debug, Deserialize)]
pub struct CreditsData {
    pub credits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The remote API is camelCase; these pin the exact wire keys.

    #[test]
    fn image_request_serializes_with_wire_keys() {
        let req = ImageJobRequest {
            files_url: vec!["https://example.com/ref.png".into()],
            prompt: "excited, holding product".into(),
            size: "2:3".into(),
            n_variants: 1,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["filesUrl"], serde_json::json!(["https://example.com/ref.png"]));
        assert_eq!(v["prompt"], "excited, holding product");
        assert_eq!(v["size"], "2:3");
        assert_eq!(v["nVariants"], 1);
    }

    #[test]
    fn video_request_serializes_with_wire_keys() {
        let req = VideoJobRequest {
            prompt: "line one".into(),
            model: "veo3_fast".into(),
            aspect_ratio: "9:16".into(),
            image_urls: vec!["https://cdn.example.com/scene1.png".into()],
            enable_fallback: true,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["aspectRatio"], "9:16");
        assert_eq!(v["imageUrls"], serde_json::json!(["https://cdn.example.com/scene1.png"]));
        assert_eq!(v["enableFallback"], true);
    }

    #[test]
    fn submit_response_parses_task_id() {
        let resp: SubmitResponse =
            serde_json::from_str(r#"{"code":200,"data":{"taskId":"task-abc"}}"#).unwrap();
        assert_eq!(resp.code, 200);
        assert_eq!(resp.data.unwrap().task_id.as_deref(), Some("task-abc"));
    }

    #[test]
    fn status_response_parses_success_payload() {
        let resp: StatusResponse = serde_json::from_str(
            r#"{"code":200,"data":{"successFlag":1,"response":{"resultUrls":["https://cdn.example.com/out.png"]}}}"#,
        )
        .unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.success_flag, 1);
        assert_eq!(
            data.response.unwrap().result_urls,
            vec!["https://cdn.example.com/out.png"]
        );
    }

    #[test]
    fn status_response_tolerates_pending_shape() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"code":200,"data":{"successFlag":0}}"#).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.success_flag, 0);
        assert!(data.response.is_none());
    }

    #[test]
    fn credits_response_parses_balance() {
        let resp: CreditsResponse =
            serde_json::from_str(r#"{"data":{"credits":4200}}"#).unwrap();
        assert_eq!(resp.data.unwrap().credits, 4200);
    }
}
