//! Share, layout and date range options shared by `merge` and `plan`.

use anyhow::{Context, Result, bail};
use boxmerge_lib::prelude::*;
use boxmerge_lib::{DEFAULT_BASE, epoch};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Where the day files come from and which of them to merge.
#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    /// Local mount point of the lab share
    #[arg(short, long)]
    pub(crate) mount: Option<PathBuf>,

    /// File server the share is exported from (e.g., files.lab.example.edu)
    #[arg(long, requires = "share")]
    server: Option<String>,

    /// Share name on the server
    #[arg(long, requires = "server")]
    share: Option<String>,

    /// User name for the share. The password is prompted for.
    #[arg(short, long)]
    username: Option<String>,

    /// Room layout file (JSON). Defaults to the built-in lab layout.
    #[arg(short, long, conflicts_with_all = ["rooms", "boxes"])]
    layout: Option<PathBuf>,

    /// Room names, comma separated
    #[arg(long, value_delimiter = ',', requires = "boxes")]
    rooms: Vec<String>,

    /// Box labels, comma separated, two per room in room order
    #[arg(long, value_delimiter = ',', requires = "rooms")]
    boxes: Vec<String>,

    /// Remote directory holding the room folders
    #[arg(long)]
    base: Option<String>,

    /// Start date (YYYY-MM-DD). Defaults to 2014-01-01.
    #[arg(short, long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    end: Option<String>,
}

impl SourceArgs {
    /// Resolves the date range to merge.
    pub(crate) fn range(&self) -> Result<DateRange> {
        let start = match &self.start {
            Some(s) => parse_date(s).with_context(|| format!("Invalid start date: {s}"))?,
            None => epoch(),
        };
        let end = match &self.end {
            Some(s) => parse_date(s).with_context(|| format!("Invalid end date: {s}"))?,
            None => chrono::Local::now().date_naive(),
        };
        Ok(DateRange::new(start, end)?)
    }

    /// Resolves the room layout: a layout file, the `--rooms`/`--boxes`
    /// lists, or the built-in layout. `--base` overrides the base of any of
    /// them.
    pub(crate) fn layout(&self) -> Result<RoomLayout> {
        let mut layout = if let Some(path) = &self.layout {
            RoomLayout::from_file(path)
                .with_context(|| format!("Failed to load layout {}", path.display()))?
        } else if !self.rooms.is_empty() {
            RoomLayout::from_positional(DEFAULT_BASE, &self.rooms, &self.boxes)
                .context("Invalid --rooms/--boxes")?
        } else {
            RoomLayout::builtin().clone()
        };

        if let Some(base) = &self.base {
            layout.base = base.clone();
        }
        Ok(layout)
    }

    /// Opens the share, prompting for a password when a user name is given.
    pub(crate) async fn connect(&self) -> Result<MountedShare> {
        let Some(mount) = &self.mount else {
            bail!("--mount is required: pass the local mount point of the lab share");
        };

        let target = match (&self.server, &self.share) {
            (Some(server), Some(share)) => Some(ShareTarget::new(server, share)),
            _ => None,
        };

        let credentials = match &self.username {
            Some(username) => {
                let password = inquire::Password::new(&format!("Password for {username}:"))
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read password")?;
                Some(Credentials::new(username, password))
            }
            None => None,
        };

        let share = MountedShare::connect(mount, target, credentials.as_ref())
            .await
            .with_context(|| format!("Failed to open share at {}", mount.display()))?;
        info!(mount = %mount.display(), "share opened");
        Ok(share)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}
