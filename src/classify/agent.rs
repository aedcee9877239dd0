//! CLI-agent classifier adapter
//!
//! Spawns an external agent command (GitHub Copilot CLI by default) with a
//! strict-JSON prompt and parses the single JSON object out of whatever
//! surrounding chatter the agent prints.

use anyhow::{bail, ensure, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::config::{CategoryConfig, ClassifierConfig};

use super::{Classifier, ClassifierResponse};

pub struct AgentClassifier {
    command: String,
    model: String,
}

impl AgentClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            command: config.command.clone(),
            model: config.model.clone(),
        }
    }
}

impl Classifier for AgentClassifier {
    fn classify(
        &self,
        image_path: &Path,
        categories: &[CategoryConfig],
    ) -> Result<ClassifierResponse> {
        ensure!(
            image_path.exists(),
            "image path is not accessible: {}",
            image_path.display()
        );

        let prompt = build_prompt(image_path, categories)?;

        let output = Command::new(&self.command)
            .arg("--model")
            .arg(&self.model)
            .arg("-p")
            .arg(&prompt)
            .output()
            .with_context(|| format!("run classifier command '{}'", self.command))?;
        ensure!(
            output.status.success(),
            "classifier command exited with {}",
            output.status
        );

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json = extract_json_object(&stdout).context("no JSON object in classifier output")?;
        let response: ClassifierResponse =
            serde_json::from_str(json).context("invalid json response")?;
        Ok(response)
    }
}

fn build_prompt(image_path: &Path, categories: &[CategoryConfig]) -> Result<String> {
    let categories_json = serde_json::to_string(categories)?;

    Ok(format!(
        "You are a screenshot classifier.\n\
         Read the image at {} and classify the screenshot.\n\
         Return ONLY valid JSON with keys: selectedCategoryId, confidence, rationale, detectedApps, detectedKeywords.\n\
         Choose exactly one category id from the list.\n\
         Categories: {}\n",
        image_path.display(),
        categories_json
    ))
}

/// First balanced top-level JSON object in `text`
fn extract_json_object(text: &str) -> Result<&str> {
    let start = match text.find('{') {
        Some(idx) => idx,
        None => bail!("no opening brace"),
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    bail!("unterminated JSON object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        let text = r#"{"selectedCategoryId":"work","confidence":0.9}"#;
        assert_eq!(extract_json_object(text).unwrap(), text);
    }

    #[test]
    fn test_extract_object_from_chatter() {
        let text = "Sure! Here is the classification:\n```json\n{\"selectedCategoryId\": \"work\", \"rationale\": \"code {editor}\"}\n```\nDone.";
        let json = extract_json_object(text).unwrap();
        let response: ClassifierResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.selected_category_id, "work");
        assert_eq!(response.rationale, "code {editor}");
    }

    #[test]
    fn test_extract_handles_nested_objects() {
        let text = r#"prefix {"a": {"b": 1}, "c": "}"} suffix"#;
        assert_eq!(
            extract_json_object(text).unwrap(),
            r#"{"a": {"b": 1}, "c": "}"}"#
        );
    }

    #[test]
    fn test_extract_rejects_missing_object() {
        assert!(extract_json_object("no json here").is_err());
        assert!(extract_json_object("{\"open\": true").is_err());
    }

    #[test]
    fn test_response_defaults_optional_fields() {
        let response: ClassifierResponse =
            serde_json::from_str(r#"{"selectedCategoryId":"work","confidence":0.4}"#).unwrap();
        assert!(response.detected_apps.is_empty());
        assert!(response.detected_keywords.is_empty());
        assert!(response.rationale.is_empty());
    }
}
