//! Record command implementation

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::app::App;

pub fn run(config_path: &str, oneshot: bool) -> Result<()> {
    let app = App::new(config_path)?;

    if oneshot {
        let event = app.record_once()?;
        println!(
            "recorded: id={} category={} confidence={:.2} status={}",
            event.id, event.category_name, event.confidence, event.status
        );
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nreceived interrupt, stopping...");
                signal_cancel.cancel();
            }
        });

        println!(
            "starting scheduler (interval: {} minutes)",
            app.config.scheduler.interval_minutes
        );
        println!("press Ctrl+C to stop");

        app.run_scheduler(cancel).await;
    });

    Ok(())
}
