//! Reset command implementation

use anyhow::Result;

use crate::app::App;

pub fn run(config_path: &str, date: Option<&str>) -> Result<()> {
    let date = super::parse_date(date)?;

    let confirmed = super::prompt_yes_no(
        &format!("This will delete events for {date}. Continue? [y/N]: "),
        false,
    )?;
    if !confirmed {
        println!("cancelled");
        return Ok(());
    }

    let app = App::new(config_path)?;
    let deleted = app.delete_events_by_date(date)?;
    println!("deleted {deleted} events for {date}");

    Ok(())
}
