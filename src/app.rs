//! Application composition and the record pipeline
//!
//! One call to [`App::record_once`] is one attempt: capture, classify,
//! persist exactly one event. A capture failure aborts the attempt with no
//! event (there is nothing to hash or reference); a classification failure
//! still records a FAILED event with the fallback category.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::capture::{self, MacScreenGrabber, ScratchGuard, ScreenGrabber};
use crate::classify::{classify_with_fallback, AgentClassifier, Classifier};
use crate::config::Config;
use crate::scheduler::Scheduler;
use crate::store::{Event, EventStore};

pub struct App {
    pub config: Config,
    pub store: EventStore,
    grabber: Box<dyn ScreenGrabber>,
    classifier: Box<dyn Classifier>,
    save_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl App {
    /// Load and validate configuration, then open the store. Any failure
    /// here is fatal to the process; nothing is left running.
    pub fn new(config_path: &str) -> Result<Self> {
        let config = Config::load(config_path)?;
        config.validate()?;

        let store = EventStore::open(&config.storage_path()?)?;
        let classifier = AgentClassifier::new(&config.classifier);

        Ok(Self {
            save_dir: capture::default_save_dir()?,
            scratch_dir: std::env::temp_dir(),
            grabber: Box::new(MacScreenGrabber),
            classifier: Box::new(classifier),
            config,
            store,
        })
    }

    /// Fully wired constructor; tests use it to substitute the adapters.
    pub fn with_parts(
        config: Config,
        store: EventStore,
        grabber: Box<dyn ScreenGrabber>,
        classifier: Box<dyn Classifier>,
        save_dir: PathBuf,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            config,
            store,
            grabber,
            classifier,
            save_dir,
            scratch_dir,
        }
    }

    /// Run one capture → classify → persist attempt.
    pub fn record_once(&self) -> Result<Event> {
        let captured = capture::capture(
            &self.config.image,
            self.grabber.as_ref(),
            &self.save_dir,
            &self.scratch_dir,
        )?;
        // scratch images are removed whichever way this function exits
        let _scratch = captured
            .cleanup_required
            .then(|| ScratchGuard::new(captured.image_path.clone()));

        let outcome = classify_with_fallback(
            self.classifier.as_ref(),
            &captured.image_path,
            &self.config.categories,
        );
        let captured_at = Utc::now();

        let mut hasher = Sha256::new();
        hasher.update(&captured.bytes);
        let screenshot_hash = hex::encode(hasher.finalize());

        let event = Event {
            id: Uuid::new_v4().to_string(),
            captured_at,
            category_name: outcome.category_name,
            confidence: outcome.confidence,
            status: outcome.status,
            agent_version: self.config.classifier.model.clone(),
            screenshot_hash,
            detected_apps: outcome.detected_apps,
            detected_keywords: outcome.detected_keywords,
            notes: format!(
                "rationale={} displayCount={} resolution={}",
                outcome.rationale, captured.display_count, captured.resolution
            ),
            created_at: Utc::now(),
        };

        self.store.insert_event(&event)?;
        Ok(event)
    }

    pub fn list_events_by_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        self.store.list_events_by_date(date)
    }

    pub fn delete_events_by_date(&self, date: NaiveDate) -> Result<usize> {
        self.store.delete_events_by_date(date)
    }

    /// Record on the configured interval until `cancel` fires. Attempt
    /// failures are logged by the scheduler and never escape the loop.
    pub async fn run_scheduler(&self, cancel: CancellationToken) {
        let scheduler = Scheduler::new(self.config.scheduler.interval_minutes);
        scheduler
            .run(|| self.record_once().map(|_| ()), cancel)
            .await;
    }
}
