use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

// @module: Audio input discovery and caption export paths

/// Extensions accepted as audio input, with their upload MIME types
const AUDIO_TYPES: [(&str, &str); 8] = [
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("webm", "audio/webm"),
];

// @struct: Filesystem helpers for songs and exported tracks
pub struct FileManager;

impl FileManager {
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: `dir` and any missing ancestors
    pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).with_context(|| format!("Cannot create directory {:?}", dir))
    }

    pub fn is_audio_file<P: AsRef<Path>>(path: P) -> bool {
        Self::audio_mime_type(path).is_some()
    }

    // @returns: Upload MIME type, judged by extension (case-insensitive)
    pub fn audio_mime_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        AUDIO_TYPES
            .iter()
            .find_map(|&(known, mime)| (known == ext).then_some(mime))
    }

    /// `<output_dir>/<song stem>.<language tag>.<extension>`
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        song: P1,
        output_dir: P2,
        language_tag: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = song
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();

        output_dir
            .as_ref()
            .join(format!("{}.{}.{}", stem, language_tag, extension))
    }

    /// Every audio file below `dir`, sorted so batch runs are repeatable
    pub fn find_audio_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut songs = WalkDir::new(dir.as_ref())
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_file() && Self::is_audio_file(e.path()) => {
                    Some(Ok(e.into_path()))
                }
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Cannot scan {:?} for audio", dir.as_ref()))?;

        songs.sort();
        Ok(songs)
    }

    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).with_context(|| format!("Cannot read audio {:?}", path))
    }

    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        fs::read_to_string(path).with_context(|| format!("Cannot read {:?}", path))
    }

    /// Write `content`, creating the parent directory on first export
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, content).with_context(|| format!("Cannot write {:?}", path))
    }

    /// Hex SHA-256 of the audio bytes; the song library keys on it
    pub fn content_hash(bytes: &[u8]) -> String {
        Sha256::digest(bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Track length in seconds from ffprobe, `None` if ffprobe is absent or fails
    pub fn probe_duration<P: AsRef<Path>>(path: P) -> Option<f64> {
        let output = Command::new("ffprobe")
            .args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path.as_ref())
            .output()
            .ok()
            .filter(|o| o.status.success())?;

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
    }
}
