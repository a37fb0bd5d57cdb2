//! Model routing: which submission endpoint serves a model and whether the
//! model answers synchronously (detection) or through the task pipeline.

use crate::error::{Result, ScopeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const VIDEO_GENERATION_SYNTHESIS: &str =
    "/api/v1/services/aigc/video-generation/video-synthesis";
pub const IMAGE2VIDEO_SYNTHESIS: &str = "/api/v1/services/aigc/image2video/video-synthesis";
pub const IMAGE2VIDEO_FACE_DETECT: &str = "/api/v1/services/aigc/image2video/face-detect";
pub const IMAGE2VIDEO_AA_DETECT: &str = "/api/v1/services/aigc/image2video/aa-detect";
pub const IMAGE2VIDEO_AA_TEMPLATE_GENERATION: &str =
    "/api/v1/services/aigc/image2video/aa-template-generation";

/// How a model delivers its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Submit returns a task id; the result is polled.
    AsyncGeneration,
    /// The submit response already is the result.
    SyncDetection,
}

impl ModelKind {
    pub fn is_async(self) -> bool {
        self == Self::AsyncGeneration
    }
}

/// One catalog entry.
///
/// # Example JSON
///
/// ```json
/// { "model_id": "emo-detect-v1", "endpoint_path": "/api/v1/services/aigc/image2video/face-detect", "kind": "sync_detection" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model_id: String,
    pub endpoint_path: String,
    pub kind: ModelKind,
}

impl ModelDescriptor {
    pub fn new(model_id: &str, endpoint_path: &str, kind: ModelKind) -> Self {
        Self {
            model_id: model_id.to_string(),
            endpoint_path: endpoint_path.to_string(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(ScopeError::Config(
                "Catalog model_id cannot be empty".to_string(),
            ));
        }
        if !self.endpoint_path.starts_with('/') {
            return Err(ScopeError::Config(format!(
                "Endpoint path '{}' for model '{}' must start with '/'",
                self.endpoint_path, self.model_id
            )));
        }
        Ok(())
    }
}

const GENERATION_MODELS: &[&str] = &[
    "wanx2.1-i2v-turbo",
    "wanx2.1-i2v-plus",
    "wan2.2-i2v-plus",
    "wan2.2-i2v-flash",
    "wan2.5-i2v-preview",
    "wan2.6-i2v-flash",
    "wan2.6-i2v",
    "wan2.6-r2v",
    "wanx2.1-t2v-plus",
    "wanx2.1-t2v-turbo",
    "wan2.2-t2v-plus",
    "wan2.5-t2v-preview",
    "wan2.6-t2v",
    "wanx2.1-vace-plus",
    "video-style-transform",
];

const IMAGE2VIDEO_MODELS: &[&str] = &[
    "wanx2.1-kf2v-plus",
    "wan2.2-kf2v-flash",
    "wan2.2-animate-mix",
    "wan2.2-s2v",
    "animate-anyone-gen2",
    "emo-v1",
    "liveportrait",
    "videoretalk",
    "emoji-v1",
];

const FACE_DETECT_MODELS: &[&str] = &[
    "wan2.2-s2v-detect",
    "emo-detect-v1",
    "liveportrait-detect",
    "emoji-detect-v1",
];

const AA_DETECT_MODELS: &[&str] = &["animate-anyone-detect-gen2"];

const AA_TEMPLATE_MODELS: &[&str] = &["animate-anyone-template-gen2"];

/// The built-in vendor catalog.
pub fn default_catalog() -> Vec<ModelDescriptor> {
    let groups: [(&[&str], &str, ModelKind); 5] = [
        (
            GENERATION_MODELS,
            VIDEO_GENERATION_SYNTHESIS,
            ModelKind::AsyncGeneration,
        ),
        (
            IMAGE2VIDEO_MODELS,
            IMAGE2VIDEO_SYNTHESIS,
            ModelKind::AsyncGeneration,
        ),
        (
            FACE_DETECT_MODELS,
            IMAGE2VIDEO_FACE_DETECT,
            ModelKind::SyncDetection,
        ),
        (AA_DETECT_MODELS, IMAGE2VIDEO_AA_DETECT, ModelKind::SyncDetection),
        (
            AA_TEMPLATE_MODELS,
            IMAGE2VIDEO_AA_TEMPLATE_GENERATION,
            ModelKind::AsyncGeneration,
        ),
    ];
    groups
        .iter()
        .flat_map(|(models, path, kind)| {
            models
                .iter()
                .map(move |model| ModelDescriptor::new(model, path, *kind))
        })
        .collect()
}

/// Parse a catalog from a JSON array of [`ModelDescriptor`]s.
pub fn catalog_from_str(s: &str) -> Result<Vec<ModelDescriptor>> {
    let entries: Vec<ModelDescriptor> = serde_json::from_str(s)
        .map_err(|e| ScopeError::Config(format!("Invalid endpoint catalog JSON: {}", e)))?;
    for entry in &entries {
        entry.validate()?;
    }
    Ok(entries)
}

pub fn catalog_from_file(path: impl AsRef<Path>) -> Result<Vec<ModelDescriptor>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ScopeError::Config(format!(
            "Failed to read endpoint catalog '{}': {}",
            path.display(),
            e
        ))
    })?;
    catalog_from_str(&contents)
}

/// O(1) `model_id -> descriptor` lookup with a default async path for
/// unknown models.
#[derive(Debug, Clone)]
pub struct EndpointRouter {
    routes: HashMap<String, ModelDescriptor>,
    default_path: String,
}

impl EndpointRouter {
    /// Build a router. Every model id must appear exactly once.
    pub fn new(entries: Vec<ModelDescriptor>, default_path: impl Into<String>) -> Result<Self> {
        let default_path = default_path.into();
        if default_path.trim().is_empty() {
            return Err(ScopeError::Config(
                "Default endpoint path cannot be empty".to_string(),
            ));
        }
        let mut routes = HashMap::with_capacity(entries.len());
        for entry in entries {
            entry.validate()?;
            if routes.contains_key(&entry.model_id) {
                return Err(ScopeError::Config(format!(
                    "Model '{}' appears more than once in the endpoint catalog",
                    entry.model_id
                )));
            }
            routes.insert(entry.model_id.clone(), entry);
        }
        Ok(Self {
            routes,
            default_path,
        })
    }

    /// Router over [`default_catalog`] with `default_path` as fallback.
    pub fn dashscope(default_path: impl Into<String>) -> Result<Self> {
        Self::new(default_catalog(), default_path)
    }

    pub fn resolve(&self, model_id: &str) -> ModelDescriptor {
        match self.routes.get(model_id) {
            Some(descriptor) => descriptor.clone(),
            None => {
                tracing::debug!(model = %model_id, path = %self.default_path, "Model not in catalog; using default endpoint");
                ModelDescriptor::new(model_id, &self.default_path, ModelKind::AsyncGeneration)
            }
        }
    }

    pub fn is_known(&self, model_id: &str) -> bool {
        self.routes.contains_key(model_id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
