//! Request options for video generation and the caller-over-defaults merge.

use crate::error::{Result, ScopeError};
use serde::{Deserialize, Serialize};

/// Model used when neither the caller nor the configured defaults name one.
pub const DEFAULT_MODEL: &str = "wanx2.1-t2v-turbo";

/// Builds `$ty` by taking each listed field from `$caller`, falling back to
/// `$defaults` where the caller left it unset.
macro_rules! merge_fields {
    ($caller:ident, $defaults:ident, $ty:ident { $($field:ident),* $(,)? }) => {
        $ty {
            $($field: $caller.$field.or_else(|| $defaults.$field.clone()),)*
        }
    };
}

/// A URL field some endpoints accept as a single string and others as a list.
/// Forwarded verbatim in whichever shape the caller chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlList {
    One(String),
    Many(Vec<String>),
}

/// The `input` object of a submit request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_frame_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_frame_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_video_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_images_url: Option<UrlList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_frame_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_clip_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Face bounding box `[x1, y1, x2, y2]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_bbox: Option<Vec<i64>>,
    /// Expanded bounding box `[x1, y1, x2, y2]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_bbox: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driven_id: Option<String>,
}

impl InputOptions {
    pub fn merge(self, defaults: &Self) -> Self {
        let caller = self;
        merge_fields!(caller, defaults, InputOptions {
            prompt,
            img_url,
            image_url,
            audio_url,
            template,
            negative_prompt,
            first_frame_url,
            last_frame_url,
            reference_video_urls,
            function,
            ref_image_url,
            ref_images_url,
            mask_frame_id,
            first_clip_url,
            video_url,
            template_id,
            face_bbox,
            ext_bbox,
            driven_id,
        })
    }
}

/// The `parameters` object of a submit request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametersOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_extend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_extension: Option<bool>,
    /// Clip length in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obj_or_bg: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ref_img_bg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_move_freq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_fps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_move_strength: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paste_back: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_move_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl ParametersOptions {
    pub fn merge(self, defaults: &Self) -> Self {
        let caller = self;
        merge_fields!(caller, defaults, ParametersOptions {
            resolution,
            size,
            prompt_extend,
            video_extension,
            duration,
            shot_type,
            obj_or_bg,
            mask_type,
            expand_ratio,
            top_scale,
            bottom_scale,
            left_scale,
            right_scale,
            mode,
            use_ref_img_bg,
            video_ratio,
            ratio,
            style_level,
            template_id,
            eye_move_freq,
            video_fps,
            mouth_move_strength,
            paste_back,
            head_move_strength,
            style,
            seed,
        })
    }
}

/// Options for one video request. Every field is optional; unset fields
/// inherit from the configured defaults.
///
/// # Example JSON
///
/// ```json
/// {
///   "model": "wan2.2-t2v-plus",
///   "input": { "prompt": "a cat surfing" },
///   "parameters": { "resolution": "1080P", "duration": 5 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub input: InputOptions,
    pub parameters: ParametersOptions,
}

impl VideoOptions {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Caller overrides defaults field by field; unset fields inherit. Nested
    /// `input` and `parameters` merge per field as well.
    pub fn merge(self, defaults: &Self) -> Self {
        Self {
            model: self.model.or_else(|| defaults.model.clone()),
            input: self.input.merge(&defaults.input),
            parameters: self.parameters.merge(&defaults.parameters),
        }
    }

    /// Model to submit to, falling back to [`DEFAULT_MODEL`].
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// A video request: free-text instructions plus options.
///
/// Instructions may be empty when the options already carry the prompt (or
/// the model needs none, e.g. template-driven generation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoPrompt {
    pub instructions: Vec<String>,
    pub options: Option<VideoOptions>,
}

impl VideoPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            instructions: vec![text.into()],
            options: None,
        }
    }

    pub fn with_options(options: VideoOptions) -> Self {
        Self {
            instructions: Vec::new(),
            options: Some(options),
        }
    }

    pub fn options(mut self, options: VideoOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Merge with `defaults` and fill `input.prompt` from the instructions
    /// when nothing else set it.
    pub fn into_options(self, defaults: &VideoOptions) -> Result<VideoOptions> {
        if self.instructions.is_empty() && self.options.is_none() {
            return Err(ScopeError::InvalidRequest(
                "Prompt instructions must not be empty".to_string(),
            ));
        }
        let mut merged = self.options.unwrap_or_default().merge(defaults);
        if merged.input.prompt.is_none() {
            let text = self
                .instructions
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !text.is_empty() {
                merged.input.prompt = Some(text);
            }
        }
        Ok(merged)
    }
}
