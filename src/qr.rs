//! QR Rendering
//!
//! Renders lookup identifiers as PNG QR codes, either inline as a data URL
//! or written to disk. Encoding is CPU-bound and runs on the blocking pool.

use async_trait::async_trait;
use base64::Engine;
use image::{ImageBuffer, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{env_parse, ConfigError};
use crate::ticket::model::Ticket;

/// Default minimum image edge in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 400;

/// Data URL prefix for PNG images.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// QR rendering errors.
#[derive(Debug, Error)]
pub enum QrError {
    /// Payload does not fit in a QR code.
    #[error("qr encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    /// PNG encoding failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Blocking task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Task(String),
}

/// QR configuration.
#[derive(Debug, Clone)]
pub struct QrConfig {
    /// Root directory for ticket images.
    pub image_dir: PathBuf,
    /// Minimum image edge in pixels.
    pub image_size: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("qr-images"),
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }
}

impl QrConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            image_dir: std::env::var("QR_IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.image_dir),
            image_size: env_parse("QR_IMAGE_SIZE")?.unwrap_or(defaults.image_size),
        })
    }

    /// Image path for a ticket: `<image_dir>/<type>/ticket-<id>.png`.
    pub fn ticket_image_path(&self, ticket: &Ticket) -> PathBuf {
        self.image_dir
            .join(ticket.ticket_type.as_str())
            .join(format!("ticket-{}.png", ticket.id))
    }
}

/// Visual encoding of lookup identifiers.
#[async_trait]
pub trait VisualEncoder: Send + Sync {
    /// Render `text` as a PNG data URL.
    async fn render_data_url(&self, text: &str) -> Result<String, QrError>;

    /// Render `text` as a PNG at `destination`; returns the absolute path.
    async fn render_to_file(&self, text: &str, destination: &Path) -> Result<PathBuf, QrError>;
}

/// PNG QR renderer.
#[derive(Debug, Clone)]
pub struct QrRenderer {
    size: u32,
}

impl QrRenderer {
    /// Renderer producing images at least `size` pixels wide.
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Rasterize `text` into a grayscale QR image.
    fn rasterize(text: &str, size: u32) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>, QrError> {
        let code = QrCode::new(text.as_bytes())?;
        Ok(code
            .render::<Luma<u8>>()
            .min_dimensions(size, size)
            .quiet_zone(true)
            .build())
    }

    /// Encode `text` as PNG bytes.
    pub fn png_bytes(text: &str, size: u32) -> Result<Vec<u8>, QrError> {
        let image = Self::rasterize(text, size)?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_SIZE)
    }
}

#[async_trait]
impl VisualEncoder for QrRenderer {
    async fn render_data_url(&self, text: &str) -> Result<String, QrError> {
        let text = text.to_string();
        let size = self.size;

        let png = tokio::task::spawn_blocking(move || Self::png_bytes(&text, size))
            .await
            .map_err(|e| QrError::Task(e.to_string()))??;

        Ok(format!(
            "{PNG_DATA_URL_PREFIX}{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }

    async fn render_to_file(&self, text: &str, destination: &Path) -> Result<PathBuf, QrError> {
        let text = text.to_string();
        let destination = destination.to_path_buf();
        let size = self.size;

        tokio::task::spawn_blocking(move || -> Result<PathBuf, QrError> {
            if let Some(parent) = destination.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let image = Self::rasterize(&text, size)?;
            image.save_with_format(&destination, ImageFormat::Png)?;
            Ok(std::fs::canonicalize(&destination)?)
        })
        .await
        .map_err(|e| QrError::Task(e.to_string()))?
    }
}
