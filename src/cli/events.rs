//! Events command implementation

use anyhow::Result;

use crate::app::App;

pub fn run(config_path: &str, date: Option<&str>) -> Result<()> {
    let date = super::parse_date(date)?;
    let app = App::new(config_path)?;

    let events = app.list_events_by_date(date)?;
    if events.is_empty() {
        println!("no events");
        return Ok(());
    }

    for event in events {
        println!(
            "{} | category={} | confidence={:.2} | status={}",
            event.captured_at.to_rfc3339(),
            event.category_name,
            event.confidence,
            event.status
        );
    }

    Ok(())
}
