// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan source acquisition
//!
//! Turns a file (raster image or paginated document) into a pixel buffer
//! plus whatever metadata its text reveals. Raster images are decoded with
//! the `image` crate. Documents go through a [`DocumentRenderer`] supplied
//! by the caller; there is no built-in or global renderer.

use crate::config::RecognitionConfig;
use crate::error::{RecognitionError, Result};
use crate::metadata::{parse_metadata, PlanMetadata};
use image::{ImageFormat, RgbaImage};
use std::path::Path;
use std::sync::Arc;

/// What kind of input a source is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Raster image (PNG, JPEG)
    Image,
    /// Paginated document (PDF), rasterized through a renderer
    Document,
}

impl SourceKind {
    /// Resolve the kind from a file name, extension or mime type, falling
    /// back to the leading bytes when the name says nothing useful
    pub fn resolve(name: &str, bytes: &[u8]) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();

        if lower == "application/pdf" {
            return Ok(SourceKind::Document);
        }
        if lower.starts_with("image/") {
            return Ok(SourceKind::Image);
        }

        let extension = Path::new(&lower)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(lower.as_str());
        match extension {
            "pdf" => return Ok(SourceKind::Document),
            "png" | "jpg" | "jpeg" => return Ok(SourceKind::Image),
            _ => {}
        }

        if bytes.starts_with(b"%PDF") {
            return Ok(SourceKind::Document);
        }
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) | Ok(ImageFormat::Jpeg) => Ok(SourceKind::Image),
            _ => Err(RecognitionError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Rasterizes documents and extracts their text
///
/// Implementations are injected into [`SourceLoader`]; tests substitute a
/// fake.
pub trait DocumentRenderer: Send + Sync {
    /// Render the first page at the given zoom factor
    fn render_first_page(&self, bytes: &[u8], scale: f32) -> Result<RgbaImage>;

    /// Concatenated plain text of the first `max_pages` pages
    fn extract_text(&self, bytes: &[u8], max_pages: usize) -> Result<String>;
}

/// Pixel buffer and metadata acquired from a source
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub kind: SourceKind,
    pub pixels: RgbaImage,
    pub metadata: PlanMetadata,
}

/// Loads plan sources, dispatching documents to an optional renderer
#[derive(Clone)]
pub struct SourceLoader {
    renderer: Option<Arc<dyn DocumentRenderer>>,
    render_scale: f32,
    max_text_pages: usize,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::from_config(&RecognitionConfig::default())
    }
}

impl SourceLoader {
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            renderer: None,
            render_scale: config.document_render_scale,
            max_text_pages: config.metadata_max_pages,
        }
    }

    /// Attach the renderer used for document inputs
    pub fn with_renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Read a file asynchronously, then decode it
    pub async fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedSource> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            RecognitionError::SourceLoadFailure(format!("{}: {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.load_bytes(name, &bytes)
    }

    /// Decode an in-memory source identified by `name` (file name or mime type)
    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<LoadedSource> {
        let kind = SourceKind::resolve(name, bytes)?;
        tracing::debug!(name, ?kind, size = bytes.len(), "Loading plan source");

        match kind {
            SourceKind::Image => {
                let pixels = image::load_from_memory(bytes)?.to_rgba8();
                Ok(LoadedSource {
                    kind,
                    pixels,
                    metadata: PlanMetadata::default(),
                })
            }
            SourceKind::Document => self.load_document(bytes),
        }
    }

    fn load_document(&self, bytes: &[u8]) -> Result<LoadedSource> {
        let renderer = self.renderer.as_ref().ok_or_else(|| {
            RecognitionError::SourceLoadFailure("no document renderer configured".into())
        })?;

        let pixels = renderer
            .render_first_page(bytes, self.render_scale)
            .map_err(|e| match e {
                RecognitionError::SourceLoadFailure(_) => e,
                other => RecognitionError::SourceLoadFailure(other.to_string()),
            })?;

        let metadata = match extract_metadata(renderer.as_ref(), bytes, self.max_text_pages) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(error = %e, "Continuing without document metadata");
                PlanMetadata::default()
            }
        };

        Ok(LoadedSource {
            kind: SourceKind::Document,
            pixels,
            metadata,
        })
    }
}

/// Pull the document text and run the metadata patterns over it
pub fn extract_metadata(
    renderer: &dyn DocumentRenderer,
    bytes: &[u8],
    max_pages: usize,
) -> Result<PlanMetadata> {
    let text = renderer
        .extract_text(bytes, max_pages)
        .map_err(|e| RecognitionError::MetadataExtractionFailure(e.to_string()))?;
    let metadata = parse_metadata(&text);
    tracing::debug!(?metadata, "Extracted document metadata");
    Ok(metadata)
}
