//! Version subcommand implementation.
//!
//! Handles `psu-remote version`: checks the build manifest against the
//! executable and reports the build date or a sentinel.

use super::{Context, OutputFormat};
use crate::error::CliResult;
use crate::manifest::{check_version, VersionStatus};
use crate::output;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Show the build version status.
#[derive(Parser, Debug)]
pub struct VersionCommand {
    /// Executable to check (defaults to this executable)
    #[arg(long, value_name = "PATH")]
    pub artifact: Option<PathBuf>,

    /// Build manifest to check (defaults to next to the executable)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Output format (plain or json)
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

#[derive(Serialize)]
struct VersionReport<'a> {
    version: &'a str,
    #[serde(flatten)]
    status: &'a VersionStatus,
}

impl VersionCommand {
    /// Execute the version command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        self.output.reject_csv("version")?;
        let status = self.status(ctx);

        match self.output {
            OutputFormat::Json => output::print_json(&VersionReport {
                version: status.display_version(),
                status: &status,
            })?,
            _ if ctx.quiet => println!("{}", status.display_version()),
            _ => output::print_version(&status),
        }

        Ok(())
    }

    fn status(&self, ctx: &Context) -> VersionStatus {
        let Some(artifact) = self.artifact.clone().or_else(|| ctx.settings.packaged_artifact()) else {
            return VersionStatus::BuildArtifactMissing;
        };
        let manifest = self
            .manifest
            .clone()
            .unwrap_or_else(|| ctx.settings.manifest_for(&artifact));

        check_version(&artifact, &manifest)
    }
}
