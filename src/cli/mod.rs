//! Command implementations for the vigil binary

pub mod events;
pub mod init;
pub mod record;
pub mod reset;
pub mod summary;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use std::io::Write;

/// Parse a `--date` argument, defaulting to the current local day
pub(crate) fn parse_date(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("invalid date: {text}")),
        None => Ok(Local::now().date_naive()),
    }
}

pub(crate) fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    let stdin = std::io::stdin();
    loop {
        print!("{prompt}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            bail!("unexpected end of input");
        }
        match line.trim().to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("please enter y or n"),
        }
    }
}

pub(crate) fn prompt_int(prompt: &str, default: u32, min: u32, max: u32) -> Result<u32> {
    let stdin = std::io::stdin();
    loop {
        print!("{prompt}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            bail!("unexpected end of input");
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(default);
        }
        match line.parse::<u32>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(value),
            Ok(_) => println!("value must be between {min} and {max}"),
            Err(_) => println!("invalid number, try again"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date(Some("2025-01-15")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

        assert!(parse_date(Some("15/01/2025")).is_err());
        assert!(parse_date(Some("2025-13-01")).is_err());

        assert_eq!(parse_date(None).unwrap(), Local::now().date_naive());
    }
}
