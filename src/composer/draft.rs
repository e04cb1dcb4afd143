// SPDX-License-Identifier: MIT
// Draft generation — thin client for the external text-generation endpoint.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::DraftConfig;
use crate::error::{AppError, Result};
use crate::model::{AthleteProfile, Coach, School};

const SYSTEM_PROMPT: &str =
    "You are an expert in crafting personalized volleyball recruitment messages.";

/// Request for a generated draft. When `prompt` is `None` the caller's
/// context is turned into a synthesized prompt ("auto" mode); otherwise the
/// free-text prompt is forwarded as-is ("custom" mode).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    pub athlete_profile: AthleteProfile,
    pub school: School,
    pub coach: Coach,
}

/// Build the auto-mode prompt from athlete, school, and coach context.
pub fn synthesize_prompt(profile: &AthleteProfile, school: &School, coach: &Coach) -> String {
    format!(
        "Create a message from an athlete to a volleyball coach expressing \
         interest in their program.\n\n\
         Athlete Profile:\n\
         - Name: {name}\n\
         - Position: {position}\n\
         - Height: {height}\n\
         - Vertical Jump: {vertical}\n\
         - GPA: {gpa}\n\
         - Graduation Year: {grad}\n\
         - Club: {club}\n\
         - About: {about}\n\
         - Interests: {interests}\n\n\
         School Details:\n\
         - School: {school_name}\n\
         - Division: {division}\n\
         - Location: {location}\n\
         - Coach: {coach_name} ({coach_title})\n\n\
         Generate a professional, personalized message expressing interest in \
         the volleyball program. Highlight relevant achievements, demonstrate \
         knowledge of the school's program, and show enthusiasm for \
         potentially joining the team.",
        name = profile.name,
        position = profile.stats.position,
        height = profile.stats.height,
        vertical = profile.stats.vertical_jump,
        gpa = profile.stats.gpa,
        grad = profile.stats.graduation_year,
        club = profile.stats.club,
        about = profile.description,
        interests = profile.interests.join(", "),
        school_name = school.name,
        division = school.division,
        location = school.location,
        coach_name = coach.name,
        coach_title = coach.title,
    )
}

/// Call the generation endpoint and return the draft text.
///
/// The endpoint answers with an `output` field that is either one string or
/// an array of fragments to concatenate. Non-2xx, transport failures, and
/// empty output all surface as `DraftGeneration` — never a crash, and the
/// user's message field stays editable.
pub async fn generate(
    client: &reqwest::Client,
    config: &DraftConfig,
    request: &DraftRequest,
) -> Result<String> {
    if config.endpoint.is_empty() {
        return Err(AppError::DraftGeneration(
            "no generation endpoint configured".into(),
        ));
    }

    let prompt = match &request.prompt {
        Some(p) if !p.trim().is_empty() => p.clone(),
        _ => synthesize_prompt(&request.athlete_profile, &request.school, &request.coach),
    };
    debug!(prompt_len = prompt.len(), "requesting draft");

    let body = json!({
        "input": {
            "prompt": prompt,
            "max_new_tokens": config.max_new_tokens,
            "temperature": 0.7,
            "top_p": 0.9,
            "repetition_penalty": 1.1,
            "system_prompt": SYSTEM_PROMPT,
        }
    });

    let mut req = client.post(&config.endpoint).json(&body);
    if let Some(token) = &config.api_token {
        req = req.bearer_auth(token);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| AppError::DraftGeneration(format!("request failed: {e}")))?;

    let status = resp.status();
    let payload: Value = resp
        .json()
        .await
        .map_err(|e| AppError::DraftGeneration(format!("invalid response body: {e}")))?;

    if !status.is_success() {
        let detail = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        warn!(%status, detail, "generation endpoint returned an error");
        return Err(AppError::DraftGeneration(format!("HTTP {status}: {detail}")));
    }

    let text = collect_output(payload.get("output"));
    if text.trim().is_empty() {
        return Err(AppError::DraftGeneration(
            "generation endpoint returned no output".into(),
        ));
    }
    Ok(text)
}

/// Join the endpoint's output into one string. Fragments arrive either as a
/// plain string or as an array of string chunks.
fn collect_output(output: Option<&Value>) -> String {
    match output {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .concat(),
        _ => String::new(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
