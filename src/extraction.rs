//! Structured résumé data extraction via the model.

use crate::errors::AppError;
use crate::gemini::GeminiClient;
use crate::model_json::parse_model_json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Contact details extracted from a résumé, when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Structured candidate data extracted from résumé text.
///
/// Every required field defaults to empty (or zero for the experience count)
/// when the model omits it, so downstream consumers never see a partial
/// mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_years")]
    pub experience_years: u32,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub previous_roles: Vec<String>,
    #[serde(default)]
    pub key_achievements: Vec<String>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
}

/// Accepts integer, fractional, or missing/null experience counts.
/// Fractional answers are truncated; anything non-numeric counts as zero.
fn lenient_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().map(|f| f.max(0.0) as u32).unwrap_or(0),
        _ => 0,
    })
}

/// Orchestrates the résumé extraction model call.
#[derive(Clone)]
pub struct ResumeExtractor {
    gemini: GeminiClient,
}

impl ResumeExtractor {
    /// Creates a new `ResumeExtractor`.
    ///
    /// # Arguments
    ///
    /// * `gemini` - The client used for the extraction call.
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Extracts structured data from résumé text.
    ///
    /// # Arguments
    ///
    /// * `resume_text` - Raw text extracted from the résumé PDF.
    ///
    /// # Returns
    ///
    /// * `Result<ResumeData, AppError>` - The structured data, or
    ///   `ExtractionFailed` wrapping the cause when the model call or
    ///   response parsing fails.
    pub async fn extract(&self, resume_text: &str) -> Result<ResumeData, AppError> {
        let prompt = build_extraction_prompt(resume_text);

        let raw = self
            .gemini
            .generate(&prompt)
            .await
            .map_err(|e| AppError::ExtractionFailed(e.to_string()))?;

        let data = parse_resume_data(&raw)?;
        tracing::info!(
            "Extracted resume data: {} skills, {} roles, {} years of experience",
            data.skills.len(),
            data.previous_roles.len(),
            data.experience_years
        );

        Ok(data)
    }
}

/// Parses model output into `ResumeData`.
///
/// The JSON response mode makes the direct parse succeed in the common case;
/// the fence-stripping heuristic is the fallback for fenced or prose-wrapped
/// replies.
fn parse_resume_data(raw: &str) -> Result<ResumeData, AppError> {
    if let Ok(data) = serde_json::from_str::<ResumeData>(raw.trim()) {
        return Ok(data);
    }

    let map = parse_model_json(raw).map_err(|e| AppError::ExtractionFailed(e.to_string()))?;
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        AppError::ExtractionFailed(format!(
            "model JSON did not match the expected schema: {}",
            e
        ))
    })
}

/// Builds the fixed-shape extraction prompt.
fn build_extraction_prompt(resume_text: &str) -> String {
    format!(
        r#"Extract structured information from the following resume text and return ONLY a valid JSON object with no additional text.

Required JSON structure:
{{
    "skills": ["skill1", "skill2", ...],
    "experience_years": number,
    "education": ["degree1", "degree2", ...],
    "previous_roles": ["role1", "role2", ...],
    "key_achievements": ["achievement1", "achievement2", ...],
    "contact_info": {{
        "name": "string",
        "email": "string",
        "phone": "string"
    }}
}}

Instructions:
- Extract all technical and soft skills mentioned
- Calculate total years of professional experience
- List all educational qualifications
- Include all job titles/roles held
- Extract key achievements and accomplishments
- Extract contact information if available
- If information is not available, use empty arrays or null values
- Return ONLY the JSON object, no explanations or additional text

Resume text:
{resume_text}

JSON Response:"#
    )
}
