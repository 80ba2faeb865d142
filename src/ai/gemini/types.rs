//! Gemini `generateContent` wire types and the analysis result

use crate::ai::prompts::{
    ELEMENTS_FIELD_DESCRIPTION, PROMPT_FIELD_DESCRIPTION, STYLE_FIELD_DESCRIPTION,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reverse-engineered prompt for one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Recreation prompt, never blank
    pub prompt: String,

    /// Key visual elements, in the order the model listed them
    pub elements: Vec<String>,

    /// Concise art style label, never blank
    pub style: String,
}

// API request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Schema,
}

/// OpenAPI-subset schema understood by Gemini structured output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Field order the model should emit; map keys are sorted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    #[default]
    Object,
    Array,
    String,
}

impl Schema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            ..Self::default()
        }
    }

    fn described(schema_type: SchemaType, description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            ..Self::of(schema_type)
        }
    }

    /// `{prompt: STRING, elements: ARRAY<STRING>, style: STRING}`, all required
    pub fn analysis_result() -> Self {
        let fields = ["prompt", "elements", "style"];

        let mut elements = Self::described(SchemaType::Array, ELEMENTS_FIELD_DESCRIPTION);
        elements.items = Some(Box::new(Self::of(SchemaType::String)));

        let mut properties = BTreeMap::new();
        properties.insert(
            "prompt".to_string(),
            Self::described(SchemaType::String, PROMPT_FIELD_DESCRIPTION),
        );
        properties.insert("elements".to_string(), elements);
        properties.insert(
            "style".to_string(),
            Self::described(SchemaType::String, STYLE_FIELD_DESCRIPTION),
        );

        Self {
            properties,
            property_ordering: fields.iter().map(|f| f.to_string()).collect(),
            required: fields.iter().map(|f| f.to_string()).collect(),
            ..Self::of(SchemaType::Object)
        }
    }
}

// API response types

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Error envelope returned on non-success statuses
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why there is no text, when the service says
    pub fn empty_reason(&self) -> Option<String> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
            })
    }
}
