/// Gallery analysis client
///
/// This module packages the populated slots into one Gemini
/// `generateContent` request: one inline-data part per image in slot order,
/// followed by the XiaoHongShu-style instruction text. A strict response
/// schema is declared so the model answers with machine-parseable JSON that
/// deserializes straight into `GalleryAnalysis`.
///
/// There is no retry or timeout policy here. A failed call surfaces as one
/// recoverable error and the user is invited to try again.

pub mod types;

use serde_json::json;

use crate::state::analysis::GalleryAnalysis;
use types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODEL: &str = "gemini-3-pro-preview";

/// One submitted image: transport payload plus declared MIME type.
#[derive(Debug, Clone)]
pub struct RequestImage {
    pub mime_type: String,
    pub data: String,
}

/// Errors from one analysis round trip
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("model returned no content")]
    Empty,
    #[error("model returned malformed content: {0}")]
    Parse(String),
}

/// Ask the model to pick a cover image and annotate the gallery.
///
/// The caller guarantees at least two images and at most one outstanding
/// call; neither is re-checked here.
pub async fn analyze_gallery(
    images: Vec<RequestImage>,
    api_key: String,
) -> Result<GalleryAnalysis, AnalysisError> {
    let image_count = images.len();
    let request = build_request(images);
    let url = format!("{}/models/{}:generateContent?key={}", BASE_URL, MODEL, api_key);

    println!("🚀 Sending {} images for analysis...", image_count);

    let response = reqwest::Client::new()
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| AnalysisError::Http(e.to_string()))?
        .error_for_status()
        .map_err(|e| AnalysisError::Http(e.to_string()))?
        .json::<GenerateContentResponse>()
        .await
        .map_err(|e| AnalysisError::Parse(e.to_string()))?;

    let text = extract_text(response)?;
    parse_analysis(&text, image_count)
}

/// Build the request body: inline images in slot order, then the
/// instruction, plus the structured-output config.
fn build_request(images: Vec<RequestImage>) -> GenerateContentRequest {
    let image_count = images.len();

    let mut parts: Vec<Part> = images
        .into_iter()
        .map(|img| Part::InlineData {
            inline_data: InlineData {
                mime_type: img.mime_type,
                data: img.data,
            },
        })
        .collect();
    parts.push(Part::Text {
        text: instruction_text(image_count),
    });

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: json!({
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }),
    }
}

/// The analysis task, in the voice of the original product: pick a cover,
/// locate each other image on it, report subject centers, and narrate in
/// XiaoHongShu style.
fn instruction_text(image_count: usize) -> String {
    format!(
        "你是一个顶级小红书摄影博主和文案专家。这有 {count} 张相关的系列照片，请执行以下深度分析：\n\n\
         1. **选出主图**：选出一张最有“封面感”的照片作为主图（返回索引 0-{max_index}）。\n\
         2. **视觉关联**：在主图中定位其他照片的视觉来源或逻辑关联点。\n\
         3. **坐标定位**：\n\
            - 给每张关联图在主图上的 X, Y 坐标 (0-100)。\n\
            - **重要**：识别每张关联图（即非主图本身）中最重要的主体内容中心点坐标 focusX, focusY (0-100)。\n\
         4. **网红文案**：\n\
            - 摘要和解读必须采用【小红书风格】。使用大量 Emoji、语气词（如“家人们谁懂啊”、“绝绝子”、“氛围感拉满”）、亲切的称呼（如“姐妹们”、“宝子们”）。\n\
            - 在总结最后添加 3-5 个热门话题标签（如 #摄影 #日常 #治愈系）。\n\
            - 鼓励读者互动（例如提问：你们更喜欢哪一张？）。\n\
         5. **语言**：全部使用中文。",
        count = image_count,
        max_index = image_count.saturating_sub(1),
    )
}

/// The strict output shape declared to the model.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mainPhotoIndex": { "type": "INTEGER" },
            "summary": {
                "type": "STRING",
                "description": "小红书风格的整体叙事总结，包含Emoji和标签"
            },
            "connections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "targetIndex": { "type": "INTEGER" },
                        "x": { "type": "NUMBER", "description": "在主图上的水平位置百分比" },
                        "y": { "type": "NUMBER", "description": "在主图上的垂直位置百分比" },
                        "focusX": { "type": "NUMBER", "description": "关联图内主体中心的水平坐标 (0-100)" },
                        "focusY": { "type": "NUMBER", "description": "关联图内主体中心的垂直坐标 (0-100)" },
                        "relationship": { "type": "STRING", "description": "如：绝美特写、氛围细节等" },
                        "interpretation": { "type": "STRING", "description": "小红书风格的单图深度解读" }
                    },
                    "required": [
                        "targetIndex", "x", "y", "focusX", "focusY",
                        "relationship", "interpretation"
                    ]
                }
            }
        },
        "required": ["mainPhotoIndex", "summary", "connections"]
    })
}

/// Pull the first text part out of the response envelope.
fn extract_text(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|part| match part {
            Part::Text { text } if !text.is_empty() => Some(text),
            _ => None,
        })
        .ok_or(AnalysisError::Empty)
}

/// Parse and domain-validate the model's JSON answer.
fn parse_analysis(text: &str, image_count: usize) -> Result<GalleryAnalysis, AnalysisError> {
    let analysis =
        GalleryAnalysis::from_json(text).map_err(|e| AnalysisError::Parse(e.to_string()))?;
    analysis
        .validate(image_count)
        .map_err(AnalysisError::Parse)?;
    Ok(analysis)
}

/// Load the Gemini API key from the environment, falling back to a key
/// file in the user's config directory.
pub fn load_api_key() -> Option<String> {
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Some(key);
        }
    }

    let path = dirs::config_dir()?.join("lenslink").join("api_key.txt");
    let key = std::fs::read_to_string(path).ok()?.trim().to_string();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}
