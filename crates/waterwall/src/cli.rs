use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "waterwall",
    author,
    version,
    about = "Interactive water-ripple renderer over a background image"
)]
pub struct Cli {
    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "1280x720")]
    pub size: String,

    /// Background image composited under the ripple field.
    #[arg(long, value_name = "PATH")]
    pub background: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let width: u32 = width
        .trim()
        .parse()
        .with_context(|| format!("invalid width in `{value}`"))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("invalid height in `{value}`"))?;
    if width == 0 || height == 0 {
        anyhow::bail!("surface size must be non-zero, got {width}x{height}");
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_sizes() {
        assert_eq!(parse_surface_size("800x600").unwrap(), (800, 600));
        assert_eq!(parse_surface_size("1920X1080").unwrap(), (1920, 1080));
        assert_eq!(parse_surface_size(" 640 x 480 ").unwrap(), (640, 480));
    }

    #[test]
    fn rejects_malformed_and_zero_sizes() {
        assert!(parse_surface_size("800").is_err());
        assert!(parse_surface_size("800x").is_err());
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("800x0").is_err());
    }
}
