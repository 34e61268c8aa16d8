//! Résumé / job-description match scoring via the model.
//!
//! The weighted rubric embedded in the prompt (skills 40%, experience 30%,
//! education 20%, overall fit 10%) is advisory text for the model; nothing
//! here computes it.

use crate::errors::AppError;
use crate::extraction::ResumeData;
use crate::gemini::GeminiClient;
use crate::model_json::parse_model_json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder used when the model reply omits a summary.
const DEFAULT_MATCH_SUMMARY: &str = "Unable to generate match summary";

/// Structured match analysis for a candidate against a job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAnalysis {
    #[serde(default, deserialize_with = "lenient_score")]
    pub match_score: i64,
    #[serde(default = "default_match_summary")]
    pub match_summary: String,
    #[serde(default)]
    pub skill_matches: Vec<String>,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
    #[serde(default)]
    pub experience_match: String,
    #[serde(default)]
    pub education_match: String,
    #[serde(default)]
    pub overall_recommendation: String,
}

fn default_match_summary() -> String {
    DEFAULT_MATCH_SUMMARY.to_string()
}

/// Accepts integer or fractional scores; fractional answers are truncated
/// and anything non-numeric counts as zero. Range clamping happens after
/// parsing, in `parse_match_analysis`.
fn lenient_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    })
}

/// Orchestrates the match-analysis model call.
#[derive(Clone)]
pub struct MatchAnalyzer {
    gemini: GeminiClient,
}

impl MatchAnalyzer {
    /// Creates a new `MatchAnalyzer`.
    ///
    /// # Arguments
    ///
    /// * `gemini` - The client used for the comparison call.
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Compares structured résumé data against a job description.
    ///
    /// # Arguments
    ///
    /// * `resume_data` - The structured data from the extraction stage.
    /// * `jd_text` - The job description text.
    ///
    /// # Returns
    ///
    /// * `Result<MatchAnalysis, AppError>` - The analysis with the score
    ///   clamped into [0, 100], or `MatchFailed` wrapping the cause.
    pub async fn analyze(
        &self,
        resume_data: &ResumeData,
        jd_text: &str,
    ) -> Result<MatchAnalysis, AppError> {
        let prompt = build_match_prompt(resume_data, jd_text)?;

        let raw = self
            .gemini
            .generate(&prompt)
            .await
            .map_err(|e| AppError::MatchFailed(e.to_string()))?;

        let analysis = parse_match_analysis(&raw)?;

        tracing::info!("Match analysis completed with score: {}", analysis.match_score);

        Ok(analysis)
    }
}

/// Parses model output into `MatchAnalysis`, falling back to the
/// fence-stripping heuristic when the direct parse fails. The score is
/// clamped into [0, 100] before the analysis is returned.
pub fn parse_match_analysis(raw: &str) -> Result<MatchAnalysis, AppError> {
    let mut analysis = match serde_json::from_str::<MatchAnalysis>(raw.trim()) {
        Ok(analysis) => analysis,
        Err(_) => {
            let map =
                parse_model_json(raw).map_err(|e| AppError::MatchFailed(e.to_string()))?;
            serde_json::from_value(Value::Object(map)).map_err(|e| {
                AppError::MatchFailed(format!(
                    "model JSON did not match the expected schema: {}",
                    e
                ))
            })?
        }
    };

    analysis.match_score = analysis.match_score.clamp(0, 100);
    Ok(analysis)
}

/// Builds the comparison prompt embedding the serialized résumé data and the
/// job description.
fn build_match_prompt(resume_data: &ResumeData, jd_text: &str) -> Result<String, AppError> {
    let resume_json = serde_json::to_string_pretty(resume_data)
        .map_err(|e| AppError::InternalError(format!("failed to serialize resume data: {}", e)))?;

    Ok(format!(
        r#"Compare the following resume data against the job description and provide a detailed match analysis. Return ONLY a valid JSON object with no additional text.

Resume Data:
{resume_json}

Job Description:
{jd_text}

Provide your analysis in the following JSON format:
{{
    "match_score": number (0-100),
    "match_summary": "detailed explanation of the match",
    "skill_matches": ["matched skills"],
    "skill_gaps": ["missing skills"],
    "experience_match": "analysis of experience alignment",
    "education_match": "analysis of education requirements",
    "overall_recommendation": "hire/consider/reject with reasoning"
}}

Scoring criteria:
- Skills match (40%): How many required skills does the candidate have?
- Experience level (30%): Does experience years and roles align with requirements?
- Education (20%): Does education meet the job requirements?
- Overall fit (10%): General alignment with job responsibilities

Be thorough in your analysis and provide specific examples.
Return ONLY the JSON object, no explanations or additional text.

JSON Response:"#
    ))
}
