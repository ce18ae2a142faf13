use crate::error::ServiceError;
use crate::upload::types::{ProcessRequest, ProcessResult, SelectedFile, UploadedFileRef};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// The two server endpoints the session talks to, plus asset retrieval.
#[async_trait]
pub trait AnimationService: Send + Sync {
    async fn upload(&self, files: &[SelectedFile]) -> Result<Vec<UploadedFileRef>, ServiceError>;

    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResult, ServiceError>;

    async fn fetch_asset(&self, file_path: &str) -> Result<Vec<u8>, ServiceError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    files: Vec<UploadedFileRef>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessResponse {
    success: bool,
    #[serde(default)]
    file_path: String,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpAnimationService {
    base_url: Url,
    client: Client,
}

impl HttpAnimationService {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::InvalidEndpoint {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// Resolves a server-returned asset path against the base URL, refusing
    /// anything that would leave the configured server.
    pub fn asset_url(&self, file_path: &str) -> Result<Url, ServiceError> {
        let url = self
            .base_url
            .join(file_path)
            .map_err(|e| ServiceError::InvalidAssetPath {
                path: file_path.to_string(),
                reason: e.to_string(),
            })?;
        if url.origin() != self.base_url.origin() {
            return Err(ServiceError::InvalidAssetPath {
                path: file_path.to_string(),
                reason: "points outside the configured server".to_string(),
            });
        }
        Ok(url)
    }
}

#[async_trait]
impl AnimationService for HttpAnimationService {
    async fn upload(&self, files: &[SelectedFile]) -> Result<Vec<UploadedFileRef>, ServiceError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.name.clone())
                .mime_str(&file.mime)?;
            form = form.part("images", part);
        }

        let url = self.endpoint("upload")?;
        debug!(%url, count = files.len(), "sending upload request");

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        let body: UploadResponse = response.json().await?;

        if !body.success {
            warn!(%status, message = ?body.message, "upload rejected by server");
            return Err(ServiceError::rejected(body.message));
        }

        info!(stored = body.files.len(), "upload accepted");
        Ok(body.files)
    }

    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResult, ServiceError> {
        let url = self.endpoint("process")?;
        debug!(
            %url,
            format = %request.format,
            duration = request.duration,
            files = request.files.len(),
            "sending process request"
        );

        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let body: ProcessResponse = response.json().await?;

        if !body.success {
            warn!(%status, message = ?body.message, "processing rejected by server");
            return Err(ServiceError::rejected(body.message));
        }

        info!(file_path = %body.file_path, file_name = %body.file_name, "animation generated");
        Ok(ProcessResult {
            file_path: body.file_path,
            file_name: body.file_name,
        })
    }

    async fn fetch_asset(&self, file_path: &str) -> Result<Vec<u8>, ServiceError> {
        let url = self.asset_url(file_path)?;
        debug!(%url, "fetching generated asset");

        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::types::OutputFormat;
    use axum::{
        extract::{Multipart, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Seen {
        parts: Arc<Mutex<Vec<(String, String, String, usize)>>>,
        process_body: Arc<Mutex<Option<Value>>>,
    }

    async fn spawn_server(app: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    async fn record_upload(State(seen): State<Seen>, mut multipart: Multipart) -> Json<Value> {
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
            seen.parts
                .lock()
                .unwrap()
                .push((name, file_name, content_type, len));
        }
        Json(json!({"success": true, "files": ["stored/0.png", {"id": 2}]}))
    }

    async fn record_process(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
        *seen.process_body.lock().unwrap() = Some(body);
        Json(json!({"success": true, "filePath": "/output/a.png", "fileName": "a.png"}))
    }

    fn png(name: &str, len: usize) -> SelectedFile {
        SelectedFile::new(name, "image/png", vec![0u8; len])
    }

    #[tokio::test]
    async fn upload_sends_each_image_as_an_images_part() {
        let seen = Seen::default();
        let app = Router::new()
            .route("/upload", post(record_upload))
            .with_state(seen.clone());
        let service = HttpAnimationService::new(spawn_server(app).await);

        let refs = service
            .upload(&[png("one.png", 10), png("two.png", 20)])
            .await
            .unwrap();

        assert_eq!(
            refs,
            vec![
                UploadedFileRef::new(json!("stored/0.png")),
                UploadedFileRef::new(json!({"id": 2})),
            ]
        );
        let parts = seen.parts.lock().unwrap().clone();
        assert_eq!(
            parts,
            vec![
                ("images".to_string(), "one.png".to_string(), "image/png".to_string(), 10),
                ("images".to_string(), "two.png".to_string(), "image/png".to_string(), 20),
            ]
        );
    }

    #[tokio::test]
    async fn upload_reports_rejection() {
        let app = Router::new().route(
            "/upload",
            post(|| async { Json(json!({"success": false})) }),
        );
        let service = HttpAnimationService::new(spawn_server(app).await);

        let err = service.upload(&[png("one.png", 1)]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { message: None }));
    }

    #[tokio::test]
    async fn plain_text_error_page_is_a_transport_failure() {
        let app = Router::new().route(
            "/upload",
            post(|| async { (StatusCode::BAD_REQUEST, "No files uploaded") }),
        );
        let service = HttpAnimationService::new(spawn_server(app).await);

        let err = service.upload(&[png("one.png", 1)]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }

    #[tokio::test]
    async fn process_posts_json_and_returns_asset_location() {
        let seen = Seen::default();
        let app = Router::new()
            .route("/process", post(record_process))
            .with_state(seen.clone());
        let service = HttpAnimationService::new(spawn_server(app).await);

        let result = service
            .process(&ProcessRequest {
                files: vec![UploadedFileRef::new(json!("stored/0.png"))],
                format: OutputFormat::Apng,
                duration: 0.5,
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            ProcessResult {
                file_path: "/output/a.png".to_string(),
                file_name: "a.png".to_string(),
            }
        );
        assert_eq!(
            seen.process_body.lock().unwrap().clone(),
            Some(json!({"files": ["stored/0.png"], "format": "apng", "duration": 0.5}))
        );
    }

    #[tokio::test]
    async fn process_rejection_carries_server_message() {
        let app = Router::new().route(
            "/process",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "message": "encoder crashed"})),
                )
            }),
        );
        let service = HttpAnimationService::new(spawn_server(app).await);

        let err = service
            .process(&ProcessRequest {
                files: vec![UploadedFileRef::new(json!("x"))],
                format: OutputFormat::Avif,
                duration: 1.0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("encoder crashed"));
    }

    #[tokio::test]
    async fn fetch_asset_reads_bytes_from_the_same_server() {
        let app = Router::new().route("/output/a.png", get(|| async { vec![1u8, 2, 3] }));
        let service = HttpAnimationService::new(spawn_server(app).await);

        assert_eq!(service.fetch_asset("/output/a.png").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unjoinable_base_url_fails_before_sending() {
        let service = HttpAnimationService::new(Url::parse("data:text/plain,blinky").unwrap());

        let err = service.upload(&[png("one.png", 1)]).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidEndpoint { ref path, .. } if path == "upload"));

        let err = service
            .process(&ProcessRequest {
                files: vec![UploadedFileRef::new(json!("x"))],
                format: OutputFormat::Apng,
                duration: 0.5,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidEndpoint { ref path, .. } if path == "process"));
    }

    #[test]
    fn asset_url_refuses_foreign_hosts() {
        let service = HttpAnimationService::new(Url::parse("http://localhost:8080/").unwrap());

        assert_eq!(
            service.asset_url("/output/a.png").unwrap().as_str(),
            "http://localhost:8080/output/a.png"
        );
        assert!(matches!(
            service.asset_url("https://elsewhere.example/a.png"),
            Err(ServiceError::InvalidAssetPath { .. })
        ));
    }
}
