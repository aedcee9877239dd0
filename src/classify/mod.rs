//! Classification orchestration
//!
//! Inference is delegated to a [`Classifier`]; this module owns the fallback
//! policy. Every attempt yields a concrete, nameable outcome: recording
//! "something happened, classification uncertain" beats silently dropping
//! the cycle.

mod agent;

use anyhow::Result;
use log::warn;
use serde::Deserialize;
use std::path::Path;

use crate::config::CategoryConfig;
use crate::store::EventStatus;

pub use agent::AgentClassifier;

/// External AI classification service. Any conforming adapter works:
/// a CLI agent, a remote API, or a test fake.
pub trait Classifier {
    fn classify(
        &self,
        image_path: &Path,
        categories: &[CategoryConfig],
    ) -> Result<ClassifierResponse>;
}

/// Raw response of the external classifier
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierResponse {
    pub selected_category_id: String,
    pub confidence: f64,
    pub rationale: String,
    pub detected_apps: Vec<String>,
    pub detected_keywords: Vec<String>,
}

/// Classification result after fallback policy, ready for event assembly
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub status: EventStatus,
    pub category_name: String,
    pub confidence: f64,
    pub rationale: String,
    pub detected_apps: Vec<String>,
    pub detected_keywords: Vec<String>,
}

/// Classify an image and apply the fallback policy:
/// - classifier failure → status FAILED, confidence 0, fallback category
/// - unknown or missing category id → first configured category, response
///   confidence and entities preserved
pub fn classify_with_fallback(
    classifier: &dyn Classifier,
    image_path: &Path,
    categories: &[CategoryConfig],
) -> ClassificationOutcome {
    let (status, response) = match classifier.classify(image_path, categories) {
        Ok(response) => (EventStatus::Ok, response),
        Err(err) => {
            warn!("classification failed: {err:#}");
            (EventStatus::Failed, ClassifierResponse::default())
        }
    };

    let mut category_name = resolve_category_name(&response.selected_category_id, categories);
    if category_name.is_empty() {
        if let Some(first) = categories.first() {
            category_name = first.name.clone();
        }
    }

    let confidence = match status {
        EventStatus::Ok => response.confidence,
        EventStatus::Failed => 0.0,
    };

    ClassificationOutcome {
        status,
        category_name,
        confidence,
        rationale: response.rationale,
        detected_apps: response.detected_apps,
        detected_keywords: response.detected_keywords,
    }
}

/// Resolve a category id against the configured list; unresolved ids yield
/// an empty name.
pub fn resolve_category_name(id: &str, categories: &[CategoryConfig]) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_default()
}
