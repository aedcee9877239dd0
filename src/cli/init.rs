//! Init command implementation
//!
//! Interactive first-run wizard: prompts for the settings people actually
//! change and writes the rest of the defaults alongside them.

use anyhow::{bail, Result};

use crate::config::{self, Config};

pub fn run(config_path: &str) -> Result<()> {
    let resolved = config::resolve_config_path(config_path);

    if resolved.exists() {
        if resolved.is_dir() {
            bail!("config path is a directory: {}", resolved.display());
        }
        let overwrite = super::prompt_yes_no(
            &format!(
                "config already exists at {}. Overwrite? [y/N]: ",
                resolved.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("cancelled");
            return Ok(());
        }
    }

    let mut config = Config::default();
    config.image.max_width = super::prompt_int(
        &format!("image.max_width [{}]: ", config.image.max_width),
        config.image.max_width,
        100,
        4096,
    )?;
    config.image.save_images = super::prompt_yes_no(
        &format!("image.save_images [{}] (y/n): ", config.image.save_images),
        config.image.save_images,
    )?;

    config.validate()?;
    config.write(config_path)?;

    println!("config written to {}", resolved.display());
    Ok(())
}
