//! Stamp subcommand implementation.
//!
//! Handles `psu-remote stamp`, run at packaging time to pair a build
//! manifest with the executable being shipped.

use super::Context;
use crate::error::{CliError, CliResult};
use crate::manifest::stamp_manifest;
use clap::Parser;
use std::path::PathBuf;

/// Write a build manifest for an executable.
#[derive(Parser, Debug)]
pub struct StampCommand {
    /// Executable to stamp (defaults to this executable)
    #[arg(long, value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Where to write the manifest (defaults to next to the executable)
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Build date as YYYYMMDD (defaults to today)
    #[arg(long, value_name = "YYYYMMDD")]
    pub date: Option<String>,
}

impl StampCommand {
    /// Execute the stamp command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let artifact = self
            .artifact
            .clone()
            .or_else(|| ctx.settings.artifact())
            .ok_or_else(|| CliError::Other("could not determine the executable to stamp".to_string()))?;
        let manifest = self
            .out
            .clone()
            .unwrap_or_else(|| ctx.settings.manifest_for(&artifact));

        let record = stamp_manifest(&artifact, &manifest, self.date.as_deref())?;

        ctx.info(&format!(
            "Stamped {} as version {} -> {}",
            artifact.display(),
            record.build_date,
            manifest.display()
        ));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::manifest::{check_version, VersionStatus};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_stamp_then_check() {
        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("psu-remote");
        fs::write(&exe, b"binary").unwrap();

        let ctx = Context {
            settings: AppSettings::default(),
            paths: None,
            verbose: false,
            quiet: true,
        };
        let cmd = StampCommand {
            artifact: Some(exe.clone()),
            out: None,
            date: Some("20250102".to_string()),
        };
        cmd.execute(&ctx).unwrap();

        let manifest = ctx.settings.manifest_for(&exe);
        assert_eq!(
            check_version(&exe, &manifest),
            VersionStatus::Normal("20250102".to_string())
        );
    }
}
