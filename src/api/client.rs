use crate::api::models::{Complaint, LoginResponse, User};
use crate::error::{Error, Result};
use crate::form::ComplaintDraft;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub http: HttpClient,
    base_api: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, base_api: Self::base_api(base_url), token: None })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_api(base_url: &str) -> String {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.ends_with("/api") { trimmed.to_string() } else { format!("{}/api", trimmed) }
    }

    /// Attachments are served from the origin, not from under `/api`.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let origin = self.base_api.trim_end_matches("/api");
        format!("{}/{}", origin, path.trim_start_matches('/'))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_api, path.trim_start_matches('/'))
    }

    fn with_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(t) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", t));
        }
        req
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .or_else(|| json.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));
        Err(Error::Api { status: status.as_u16(), message })
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let resp = self.with_auth(self.http.get(self.url(path))).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Some routes wrap their payload in `{ data: ... }` or `{ user: ... }`.
    fn unwrap_envelope(json: Value, keys: &[&str]) -> Value {
        for key in keys {
            if let Some(inner) = json.get(*key) {
                if inner.is_object() || inner.is_array() {
                    return inner.clone();
                }
            }
        }
        json
    }

    pub async fn login(&self, phone: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::json!({ "phone": phone, "password": password });
        let resp = self.http.post(self.url("auth/login")).json(&body).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn register(&self, phone: &str, password: &str, full_name: Option<&str>) -> Result<()> {
        let mut body = serde_json::json!({ "phone": phone, "password": password });
        if let Some(name) = full_name {
            body["fullName"] = Value::String(name.to_string());
        }
        let resp = self.http.post(self.url("auth/register")).json(&body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User> {
        let json = self.get_json("users/me").await?;
        Ok(serde_json::from_value(Self::unwrap_envelope(json, &["user", "data"]))?)
    }

    pub async fn update_me(&self, full_name: Option<&str>, email: Option<&str>) -> Result<User> {
        let body = serde_json::json!({ "fullName": full_name, "email": email });
        let resp = self.with_auth(self.http.patch(self.url("users/me"))).json(&body).send().await?;
        let json: Value = Self::check(resp).await?.json().await?;
        Ok(serde_json::from_value(Self::unwrap_envelope(json, &["user", "data"]))?)
    }

    pub async fn my_complaints(&self) -> Result<Vec<Complaint>> {
        let json = self.get_json("complaints/mine").await?;
        let items = match Self::unwrap_envelope(json, &["data", "complaints"]) {
            Value::Array(arr) => arr,
            _ => Vec::new(),
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<Complaint>(item) {
                Ok(c) => out.push(c),
                Err(e) => log::warn!("Skipping malformed complaint: {e}"),
            }
        }
        Ok(out)
    }

    pub async fn complaint(&self, id: &str) -> Result<Complaint> {
        let json = self.get_json(&format!("complaints/{}", id)).await?;
        Ok(serde_json::from_value(Self::unwrap_envelope(json, &["data", "complaint"]))?)
    }

    async fn build_form(draft: &ComplaintDraft) -> Result<Form> {
        let mut form = Form::new()
            .text("title", draft.title.trim().to_string())
            .text("description", draft.description.trim().to_string())
            .text("type", draft.kind.trim().to_string());
        let optional = [
            ("location", draft.location.as_deref()),
            ("priority", draft.priority.map(|p| p.as_str())),
            ("phone", draft.phone.as_deref()),
            ("email", draft.email.as_deref()),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                form = form.text(name, v.to_string());
            }
        }
        for (i, a) in draft.attachments.iter().enumerate() {
            let bytes = tokio::fs::read(&a.path).await?;
            let part = Part::bytes(bytes)
                .file_name(a.upload_name(i))
                .mime_str(if a.mime.is_empty() { "application/octet-stream" } else { a.mime.as_str() })?;
            form = form.part("attachments", part);
        }
        Ok(form)
    }

    /// Returns the created complaint when the backend echoes it back.
    pub async fn submit_complaint(&self, draft: &ComplaintDraft) -> Result<Option<Complaint>> {
        draft.validate()?;
        let form = Self::build_form(draft).await?;
        let resp = self.with_auth(self.http.post(self.url("complaints"))).multipart(form).send().await?;
        let json: Value = Self::check(resp).await?.json().await.unwrap_or(Value::Null);
        Ok(serde_json::from_value(Self::unwrap_envelope(json, &["data", "complaint"])).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ComplaintStatus;
    use crate::form::AttachmentDraft;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_api_appends_suffix_once() {
        assert_eq!(ApiClient::base_api("https://x.io/"), "https://x.io/api");
        assert_eq!(ApiClient::base_api("https://x.io/api/"), "https://x.io/api");
    }

    #[test]
    fn asset_url_strips_api_suffix() {
        let c = ApiClient::new("https://x.io/api", Duration::from_secs(1)).unwrap();
        assert_eq!(c.asset_url("/uploads/a.jpg"), "https://x.io/uploads/a.jpg");
        assert_eq!(c.asset_url("https://cdn.io/a.jpg"), "https://cdn.io/a.jpg");
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({ "phone": "0599", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok",
                "user": { "_id": "u1", "phone": "0599" }
            })))
            .mount(&server)
            .await;

        let res = client(&server).login("0599", "pw").await.unwrap();
        assert_eq!(res.token, "tok");
        assert_eq!(res.user.id, "u1");
    }

    #[tokio::test]
    async fn api_error_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({ "message": "wrong password" })))
            .mount(&server)
            .await;

        let err = client(&server).login("0599", "bad").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));
        assert_eq!(err.to_string(), "wrong password");
        assert!(!err.is_offline());
    }

    #[tokio::test]
    async fn my_complaints_sends_token_and_skips_bad_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/complaints/mine"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "_id": "c1", "title": "Leak", "type": "repair", "status": "resolved", "createdAt": "2024-01-02T00:00:00Z" },
                    { "title": "no id" }
                ]
            })))
            .mount(&server)
            .await;

        let list = client(&server).with_token(Some("tok".into())).my_complaints().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, ComplaintStatus::Resolved);
    }

    #[tokio::test]
    async fn submit_sends_multipart_with_attachment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/complaints"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "_id": "c9", "title": "Leak", "type": "repair", "createdAt": "2024-01-02T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("photo.png");
        std::fs::write(&file, b"png-bytes").unwrap();

        let mut draft = ComplaintDraft { title: " Leak ".into(), kind: "repair".into(), ..Default::default() };
        draft.add_attachment(AttachmentDraft::from_path(&file));

        let created = client(&server).submit_complaint(&draft).await.unwrap();
        assert_eq!(created.map(|c| c.id), Some("c9".to_string()));

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap().to_string();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"attachments\"; filename=\"photo.png\""));
        assert!(body.contains("image/png"));
        assert!(body.contains("png-bytes"));
        assert!(body.contains("\r\n\r\nLeak\r\n"));
    }

    #[tokio::test]
    async fn submit_rejects_invalid_draft_without_request() {
        let server = MockServer::start().await;
        let err = client(&server).submit_complaint(&ComplaintDraft::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_is_offline() {
        let c = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = c.my_complaints().await.unwrap_err();
        assert!(err.is_offline());
    }
}
