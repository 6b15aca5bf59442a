use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConvertError, UploadError};
use crate::pipeline::{tab_text, Pipeline};
use crate::upload::{Upload, UploadRoot};

/// Body of a `/convert` response: `{"tab": ...}` or `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertResponse {
    Tab(String),
    Error(String),
}

impl ConvertResponse {
    pub fn from_result(result: &Result<String, ConvertError>) -> (StatusCode, Self) {
        match result {
            Ok(tab) => (StatusCode::OK, ConvertResponse::Tab(tab.clone())),
            Err(e) => (e.status(), ConvertResponse::Error(e.to_string())),
        }
    }
}

/// Upload validation, workspace handling and the pipeline, without any transport
#[derive(Debug)]
pub struct ConvertService {
    root: UploadRoot,
    pipeline: Pipeline,
}

impl ConvertService {
    pub fn new(root: UploadRoot, pipeline: Pipeline) -> Self {
        ConvertService { root, pipeline }
    }

    pub fn root(&self) -> &UploadRoot {
        &self.root
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Convert one upload into tab text
    ///
    /// A tab stage failure still yields `Ok`, with the error message
    /// embedded in the text. The workspace is removed on every path.
    pub fn convert(&self, upload: Option<Upload>) -> Result<String, ConvertError> {
        let upload = upload.ok_or(UploadError::MissingFile)?;
        if upload.filename.is_empty() {
            return Err(UploadError::EmptyFilename.into());
        }

        let workspace = self.root.workspace()?;
        let image = workspace.save(&upload)?;
        info!(
            filename = %upload.filename,
            bytes = upload.bytes.len(),
            "converting upload"
        );

        let outcome = self.pipeline.run(&image, &workspace.track_path())?;
        if let Err(e) = &outcome {
            warn!("tab generation failed for {}: {}", upload.filename, e);
        }

        Ok(tab_text(&outcome))
    }

    pub fn respond(&self, upload: Option<Upload>) -> (StatusCode, ConvertResponse) {
        let result = self.convert(upload);
        if let Err(e) = &result {
            warn!("conversion rejected: {}", e);
        }
        ConvertResponse::from_result(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> ConvertService {
        let root = UploadRoot::create(Some(dir.path())).unwrap();
        ConvertService::new(root, Pipeline::new(ConversionOptions::default()))
    }

    #[test]
    fn test_response_shape() {
        let tab = serde_json::to_value(ConvertResponse::Tab("e|--".into())).unwrap();
        assert_eq!(tab, serde_json::json!({"tab": "e|--"}));

        let error = serde_json::to_value(ConvertResponse::Error("No file uploaded".into())).unwrap();
        assert_eq!(error, serde_json::json!({"error": "No file uploaded"}));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let (status, response) = service_in(&dir).respond(None);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, ConvertResponse::Error("No file uploaded".into()));
    }

    #[test]
    fn test_empty_filename_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (status, response) = service_in(&dir).respond(Some(Upload::new("", vec![1u8, 2, 3])));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, ConvertResponse::Error("No selected file".into()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_undecodable_image_cleans_up() {
        let dir = TempDir::new().unwrap();
        let (status, response) =
            service_in(&dir).respond(Some(Upload::new("scan.png", b"garbage".to_vec())));

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        match response {
            ConvertResponse::Error(message) => {
                assert!(message.starts_with("Failed to decode image: scan.png"))
            }
            other => panic!("expected an error, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
