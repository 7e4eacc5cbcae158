//! Prompt text for the incident extraction call.

use crate::base::config::Config;

/// System instruction for the extraction call.
///
/// Enumerates every report field and its type so the model has a closed
/// target. Optional fields are explicitly tagged as nullable to keep the
/// model from omitting them or inventing values for them.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#####"
# Role

You are an expert IT incident analyst. You transform messy ticket notes, chat transcripts, logs, and outage descriptions into a structured incident report.

# Extraction Rules

- Build the timeline from the events in the text, with timestamps. Infer relative times (e.g. "about 10 minutes later") when exact timestamps are unavailable.
- Base the root cause hypothesis on symptoms and error patterns. State "unknown" rather than guessing.
- List every affected system or service mentioned.
- Assess impact: users affected, downtime duration, business impact.
- Produce actionable next steps with priorities.
- Be concise but thorough. If information is missing, indicate that explicitly rather than fabricating details.

# Output Contract

Respond with a single valid JSON object in exactly this shape. Optional fields are nullable; set them to null rather than omitting them or inventing values.

{
  "incident_id": "string or null",
  "title": "string",
  "executive_summary": "string",
  "affected_systems": ["string"],
  "timeline": [
    {
      "timestamp": "string",
      "event_description": "string",
      "severity": "string or null (e.g. critical, warning, info)"
    }
  ],
  "root_cause_hypothesis": "string",
  "impact_assessment": "string",
  "resolution_summary": "string",
  "action_items": [
    {
      "task": "string",
      "priority": "string (e.g. high, medium, low)",
      "assigned_to": "string or null",
      "estimated_completion": "string or null"
    }
  ],
  "related_incidents": ["string"] or null
}

Return only the JSON object, nothing else.
"#####;

/// Get the system prompt, using the config override if provided.
pub fn get_system_prompt(config: &Config) -> &str {
    if let Some(custom_prompt) = &config.system_prompt { custom_prompt } else { EXTRACTION_SYSTEM_PROMPT }
}

/// Build the user instruction: a short lead-in plus the raw text verbatim.
pub fn build_user_prompt(raw_input: &str) -> String {
    format!("Analyze this incident and return a JSON report:\n\n{raw_input}")
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_every_report_field() {
        let fields = [
            "incident_id",
            "title",
            "executive_summary",
            "affected_systems",
            "timeline",
            "timestamp",
            "event_description",
            "severity",
            "root_cause_hypothesis",
            "impact_assessment",
            "resolution_summary",
            "action_items",
            "task",
            "priority",
            "assigned_to",
            "estimated_completion",
            "related_incidents",
        ];

        for field in fields {
            assert!(EXTRACTION_SYSTEM_PROMPT.contains(field), "system prompt is missing field: {field}");
        }
    }

    #[test]
    fn system_prompt_forbids_fabrication() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("rather than fabricating"));
    }

    #[test]
    fn user_prompt_embeds_raw_text_verbatim() {
        let raw = "prod db slow\nusers seeing 500s since 2:45pm\n<weird & specials> #ok";
        let prompt = build_user_prompt(raw);

        assert!(prompt.ends_with(raw));
        assert!(prompt.starts_with("Analyze this incident"));
    }
}
