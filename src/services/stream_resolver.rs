//! Stream resolution: turns a watch URL into playable media streams.
//!
//! The extraction itself is delegated to an external extractor program
//! (`yt-dlp` by default) whose `--dump-single-json` output is parsed here.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::types::errors::ResolverError;
use crate::types::stream::StreamInfo;

/// Streams at or above this height are preferred.
pub const PREFERRED_MIN_RESOLUTION: u32 = 720;

/// Environment variable naming the extractor program.
pub const EXTRACTOR_ENV: &str = "YOUTUBE_MINI_EXTRACTOR";

/// Resolves stream descriptors and metadata for a video URL.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Returns the streams in the resolver's own ranking order.
    async fn resolve_streams(&self, url: &str) -> Result<Vec<StreamInfo>, ResolverError>;
    async fn resolve_title(&self, url: &str) -> Result<String, ResolverError>;
}

/// Picks the stream to hand to the player.
///
/// Only natively playable streams qualify. Among those, the highest resolution
/// at or above 720p wins; if none reach 720p the highest overall wins. Ties
/// keep the first stream in resolver order.
pub fn select_best_stream(streams: &[StreamInfo]) -> Option<&StreamInfo> {
    let playable = || streams.iter().filter(|s| s.natively_playable);

    let preferred = first_max_by_resolution(
        playable().filter(|s| s.resolution_or_zero() >= PREFERRED_MIN_RESOLUTION),
    );
    preferred.or_else(|| first_max_by_resolution(playable()))
}

/// `Iterator::max_by_key` returns the last maximum; this keeps the first.
fn first_max_by_resolution<'a>(
    streams: impl Iterator<Item = &'a StreamInfo>,
) -> Option<&'a StreamInfo> {
    streams.fold(None, |best: Option<&StreamInfo>, s| match best {
        Some(b) if b.resolution_or_zero() >= s.resolution_or_zero() => Some(b),
        _ => Some(s),
    })
}

/// Metadata extracted for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedVideo {
    pub title: String,
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Deserialize)]
struct DumpJson {
    title: Option<String>,
    #[serde(default)]
    is_live: Option<bool>,
    #[serde(default)]
    formats: Vec<DumpFormat>,
}

#[derive(Debug, Deserialize)]
struct DumpFormat {
    url: Option<String>,
    height: Option<u32>,
    ext: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    matches!(codec.as_deref(), Some(c) if !c.is_empty() && c != "none")
}

/// Parses the extractor's JSON dump. Formats without a URL are skipped.
pub fn parse_extractor_output(raw: &[u8]) -> Result<ExtractedVideo, ResolverError> {
    let dump: DumpJson =
        serde_json::from_slice(raw).map_err(|e| ResolverError::Parse(e.to_string()))?;

    if dump.is_live == Some(true) {
        return Err(ResolverError::LiveStream);
    }

    let title = dump
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ResolverError::Parse("missing title".to_string()))?;

    let streams = dump
        .formats
        .into_iter()
        .filter_map(|f| {
            let url = f.url?;
            let file_extension = f.ext.unwrap_or_default();
            let natively_playable =
                file_extension == "mp4" && has_codec(&f.vcodec) && has_codec(&f.acodec);
            Some(StreamInfo {
                url,
                resolution: f.height,
                file_extension,
                natively_playable,
            })
        })
        .collect();

    Ok(ExtractedVideo { title, streams })
}

/// Maps the extractor's error output onto a typed failure.
pub fn classify_extractor_error(stderr: &str) -> ResolverError {
    let lower = stderr.to_lowercase();
    if lower.contains("private video") {
        ResolverError::VideoPrivate
    } else if lower.contains("members-only") || lower.contains("join this channel") {
        ResolverError::MembersOnly
    } else if lower.contains("confirm your age") || lower.contains("age-restricted") {
        ResolverError::AgeRestricted
    } else if lower.contains("not available in your country")
        || lower.contains("blocked it in your country")
    {
        ResolverError::RegionBlocked
    } else if lower.contains("live event") || lower.contains("is live") {
        ResolverError::LiveStream
    } else if lower.contains("giving up after") || lower.contains("retries exceeded") {
        ResolverError::MaxRetriesExceeded
    } else if lower.contains("video unavailable") || lower.contains("this video is not available")
    {
        ResolverError::VideoUnavailable
    } else if lower.contains("unable to extract") && lower.contains("regex") {
        ResolverError::RegexMismatch(stderr.trim().to_string())
    } else {
        ResolverError::Extraction(stderr.trim().to_string())
    }
}

/// Runs an external extractor program per request.
pub struct CommandStreamResolver {
    program: PathBuf,
}

impl CommandStreamResolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses `$YOUTUBE_MINI_EXTRACTOR`, falling back to `yt-dlp` on `PATH`.
    pub fn from_env() -> Self {
        match std::env::var_os(EXTRACTOR_ENV) {
            Some(value) if !value.is_empty() => Self::new(value),
            _ => Self::new("yt-dlp"),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    async fn extract(&self, url: &str) -> Result<ExtractedVideo, ResolverError> {
        debug!(program = %self.program.display(), url, "running extractor");
        let output = Command::new(&self.program)
            .args([
                "--dump-single-json",
                "--no-warnings",
                "--no-playlist",
                "--skip-download",
                url,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ResolverError::ProgramFailed(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(classify_extractor_error(&String::from_utf8_lossy(
                &output.stderr,
            )));
        }

        let video = parse_extractor_output(&output.stdout)?;
        info!(url, streams = video.streams.len(), "extracted streams");
        Ok(video)
    }
}

#[async_trait]
impl StreamResolver for CommandStreamResolver {
    async fn resolve_streams(&self, url: &str) -> Result<Vec<StreamInfo>, ResolverError> {
        Ok(self.extract(url).await?.streams)
    }

    async fn resolve_title(&self, url: &str) -> Result<String, ResolverError> {
        Ok(self.extract(url).await?.title)
    }
}
