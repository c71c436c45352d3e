//! Sprite and sound tables loaded once at startup.
//!
//! `AssetRegistry` is built by an explicit load call and never mutated
//! afterwards; share it behind an `Arc`. Per-file failures during a directory
//! scan do not abort the load. They are collected into a `LoadReport` so the
//! caller decides whether a partial asset set is acceptable.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::wav_stream::WavStreamReader;

/// Decoded RGBA8 sprite pixels.
#[derive(Debug, Clone)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl SpriteImage {
    pub fn decode_png(bytes: &[u8]) -> Result<Self, String> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| format!("PNG decode failed: {e}"))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLoad {
    pub path: PathBuf,
    pub outcome: LoadOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub entries: Vec<FileLoad>,
}

impl LoadReport {
    fn record(&mut self, path: PathBuf, result: Result<(), String>) {
        let outcome = match result {
            Ok(()) => LoadOutcome::Loaded,
            Err(reason) => LoadOutcome::Failed(reason),
        };
        self.entries.push(FileLoad { path, outcome });
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.entries.extend(other.entries);
    }

    pub fn loaded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == LoadOutcome::Loaded)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            LoadOutcome::Failed(reason) => Some((e.path.as_path(), reason.as_str())),
            LoadOutcome::Loaded => None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

#[derive(Debug, Default)]
pub struct AssetRegistry {
    sprites: HashMap<String, SpriteImage>,
    sounds: HashMap<String, Arc<[u8]>>,
}

impl AssetRegistry {
    /// Scans both directories. Only an unreadable directory is an error.
    pub fn load(sprites_dir: &Path, sounds_dir: &Path) -> Result<(Self, LoadReport), String> {
        let mut registry = Self::default();
        let mut report = registry.load_sprites(sprites_dir)?;
        report.merge(registry.load_sounds(sounds_dir)?);
        log::info!(
            "Assets loaded: {} sprites, {} sounds ({} failures)",
            registry.sprites.len(),
            registry.sounds.len(),
            report.entries.len() - report.loaded()
        );
        Ok((registry, report))
    }

    pub fn load_sprites(&mut self, dir: &Path) -> Result<LoadReport, String> {
        let mut report = LoadReport::default();
        for path in list_files(dir)? {
            let result = fs::read(&path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))
                .and_then(|bytes| SpriteImage::decode_png(&bytes))
                .map(|sprite| {
                    log::debug!(
                        "Sprite {} ({}x{})",
                        path.display(),
                        sprite.width,
                        sprite.height
                    );
                    self.sprites.insert(file_name(&path), sprite);
                });
            report.record(path, result);
        }
        Ok(report)
    }

    /// Stores whole files, header included; playback goes through
    /// `WavStreamReader`, which skips the header itself.
    pub fn load_sounds(&mut self, dir: &Path) -> Result<LoadReport, String> {
        let mut report = LoadReport::default();
        for path in list_files(dir)? {
            let result = fs::read(&path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))
                .map(|bytes| {
                    log::debug!("Sound {} ({} bytes)", path.display(), bytes.len());
                    self.sounds.insert(file_name(&path), bytes.into());
                });
            report.record(path, result);
        }
        Ok(report)
    }

    pub fn sprite(&self, name: &str) -> Option<&SpriteImage> {
        self.sprites.get(name)
    }

    pub fn sprites(&self) -> impl Iterator<Item = (&str, &SpriteImage)> {
        self.sprites.iter().map(|(name, sprite)| (name.as_str(), sprite))
    }

    pub fn sound(&self, name: &str) -> Option<&Arc<[u8]>> {
        self.sounds.get(name)
    }

    /// A fresh reader over the cached bytes. Each call gets its own cursor.
    pub fn sound_stream(&self, name: &str) -> Option<WavStreamReader> {
        self.sounds
            .get(name)
            .map(|bytes| WavStreamReader::new(Arc::clone(bytes)))
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("Failed to read asset directory {}: {e}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
