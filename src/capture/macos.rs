//! macOS capture adapter built on `screencapture` and `sips`

use anyhow::{ensure, Context, Result};
use std::path::Path;
use std::process::Command;

use crate::config::CaptureFormat;

use super::ScreenGrabber;

pub struct MacScreenGrabber;

impl ScreenGrabber for MacScreenGrabber {
    fn grab(&self, raw_png: &Path) -> Result<()> {
        let status = Command::new("screencapture")
            .args(["-x", "-t", "png"])
            .arg(raw_png)
            .status()
            .context("run screencapture")?;
        ensure!(status.success(), "screencapture exited with {status}");
        Ok(())
    }

    fn resize(
        &self,
        raw_png: &Path,
        out: &Path,
        max_width: u32,
        format: CaptureFormat,
    ) -> Result<()> {
        let status = Command::new("sips")
            .args(["-s", "format", format.sips_name()])
            .args(["-Z", &max_width.to_string()])
            .arg(raw_png)
            .arg("--out")
            .arg(out)
            .status()
            .context("run sips")?;
        ensure!(status.success(), "sips exited with {status}");
        Ok(())
    }
}
