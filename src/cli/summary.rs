//! Summary command implementation

use anyhow::{bail, Result};

use crate::app::App;
use crate::summary::generate;

pub fn run(config_path: &str, date: Option<&str>, format: &str) -> Result<()> {
    let date = super::parse_date(date)?;
    let app = App::new(config_path)?;

    let events = app.list_events_by_date(date)?;
    let daily = generate(&events);

    match format {
        "text" => println!("{}", daily.format_text()),
        "markdown" => println!("{}", daily.format_markdown()),
        other => bail!("unknown format: {other}"),
    }

    Ok(())
}
