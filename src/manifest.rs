//! Build manifest - version display and build integrity check.
//!
//! At packaging time `stamp_manifest` records the build date together with
//! the SHA-256 digest of the executable it ships with, signed with an
//! HMAC-SHA256 tag keyed by the base64 form of that digest. At startup
//! `check_version` recomputes the digest and verifies the tag, so a manifest
//! only reads as valid next to the exact executable it was stamped for.
//!
//! This is a sanity check that runtime files belong together, not a
//! licensing boundary; nothing is gated on the result.

use crate::error::ManifestError;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{Local, NaiveDate};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Default manifest file name, placed next to the executable.
pub const MANIFEST_FILE_NAME: &str = "psu-remote.manifest.json";

const DATE_FORMAT: &str = "%Y%m%d";

/// Signed build metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Build date, `YYYYMMDD`.
    pub build_date: String,
    /// Lowercase hex SHA-256 of the paired executable.
    pub artifact_sha256: String,
    /// URL-safe base64 HMAC-SHA256 over date and digest.
    pub tag: String,
}

/// Outcome of the startup version check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum VersionStatus {
    /// Manifest verified; carries the build date.
    Normal(String),
    /// The executable to check against does not exist. Expected when
    /// running outside a packaged build.
    BuildArtifactMissing,
    /// Manifest missing, unreadable, or not signed for this executable.
    TokenMissingOrInvalid,
}

impl VersionStatus {
    /// Eight-character version string shown to the operator.
    pub fn display_version(&self) -> &str {
        match self {
            Self::Normal(date) => date,
            Self::BuildArtifactMissing => "00000001",
            Self::TokenMissingOrInvalid => "00000000",
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version {}", self.display_version())
    }
}

/// Default manifest location for an artifact.
pub fn default_manifest_path(artifact: &Path) -> PathBuf {
    artifact.with_file_name(MANIFEST_FILE_NAME)
}

/// Check the manifest at `manifest` against the executable at `artifact`.
pub fn check_version(artifact: &Path, manifest: &Path) -> VersionStatus {
    if !artifact.is_file() {
        debug!(artifact = %artifact.display(), "build artifact not found");
        return VersionStatus::BuildArtifactMissing;
    }

    match verify(artifact, manifest) {
        Some(date) => VersionStatus::Normal(date),
        None => VersionStatus::TokenMissingOrInvalid,
    }
}

/// Write a manifest for `artifact`, dated `date` (today if `None`).
pub fn stamp_manifest(
    artifact: &Path,
    manifest: &Path,
    date: Option<&str>,
) -> Result<BuildManifest, ManifestError> {
    if !artifact.is_file() {
        return Err(ManifestError::ArtifactNotFound(artifact.to_path_buf()));
    }

    let build_date = match date {
        Some(d) => {
            parse_build_date(d).ok_or_else(|| ManifestError::InvalidDate(d.to_string()))?;
            d.to_string()
        }
        None => Local::now().format(DATE_FORMAT).to_string(),
    };

    let digest = artifact_digest(&fs::read(artifact)?);
    let artifact_sha256 = to_hex(&digest);
    let tag = URL_SAFE.encode(sign(&digest, &build_date, &artifact_sha256).finalize().into_bytes());

    let record = BuildManifest {
        build_date,
        artifact_sha256,
        tag,
    };
    fs::write(manifest, serde_json::to_string_pretty(&record)?)?;

    Ok(record)
}

fn verify(artifact: &Path, manifest: &Path) -> Option<String> {
    let content = fs::read_to_string(manifest)
        .map_err(|e| debug!(manifest = %manifest.display(), error = %e, "manifest unreadable"))
        .ok()?;
    let record: BuildManifest = serde_json::from_str(&content)
        .map_err(|e| debug!(error = %e, "manifest malformed"))
        .ok()?;

    let digest = artifact_digest(&fs::read(artifact).ok()?);
    if to_hex(&digest) != record.artifact_sha256 {
        debug!("manifest was stamped for a different executable");
        return None;
    }

    let tag = URL_SAFE.decode(record.tag.as_bytes()).ok()?;
    if sign(&digest, &record.build_date, &record.artifact_sha256)
        .verify_slice(&tag)
        .is_err()
    {
        debug!("manifest signature mismatch");
        return None;
    }

    parse_build_date(&record.build_date)?;
    Some(record.build_date)
}

fn artifact_digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// HMAC keyed by the URL-safe base64 text of the artifact digest.
fn sign(digest: &[u8; 32], build_date: &str, artifact_sha256: &str) -> HmacSha256 {
    let key = URL_SAFE.encode(digest);
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC key length is always valid");
    mac.update(build_date.as_bytes());
    mac.update(b":");
    mac.update(artifact_sha256.as_bytes());
    mac
}

fn parse_build_date(date: &str) -> Option<NaiveDate> {
    if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
