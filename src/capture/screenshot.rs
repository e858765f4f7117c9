//! Randomized screenshot capture
//!
//! Each scheduling window draws a handful of distinct random instants and
//! fires the shutter once at each of them. The next window is only drawn once
//! the current one has fully elapsed, so captures stay spread out no matter
//! how late in a window the draw lands.

use crate::capture::context::{CursorPosition, SharedContext};
use crate::capture::traits::{CaptureError, CaptureResult, CapturedFrame, DisplayBounds, ScreenSource};
use async_trait::async_trait;
use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Something that takes one screenshot when fired
#[async_trait]
pub trait Shutter: Send + Sync {
    async fn fire(&self);
}

/// Draw `count` distinct offsets in `[0, window)` at millisecond resolution,
/// sorted ascending.
pub fn draw_offsets<R: Rng + ?Sized>(rng: &mut R, window: Duration, count: usize) -> Vec<Duration> {
    let slots = usize::try_from(window.as_millis()).unwrap_or(usize::MAX);
    let count = count.min(slots);
    if count == 0 {
        return Vec::new();
    }

    let mut offsets: Vec<Duration> = rand::seq::index::sample(rng, slots, count)
        .into_iter()
        .map(|ms| Duration::from_millis(ms as u64))
        .collect();
    offsets.sort();
    offsets
}

/// Display under the cursor, else the primary display, else the first one.
pub fn select_display(
    displays: &[DisplayBounds],
    cursor: Option<CursorPosition>,
) -> Option<&DisplayBounds> {
    cursor
        .and_then(|c| displays.iter().find(|d| d.contains(c.x, c.y)))
        .or_else(|| displays.iter().find(|d| d.is_primary))
        .or_else(|| displays.first())
}

/// `screenshot_<date>_<time>_<micros>.png`, suffixed if the name is taken.
pub fn screenshot_path(dir: &Path) -> PathBuf {
    let stem = format!("screenshot_{}", Local::now().format("%Y%m%d_%H%M%S_%6f"));
    let mut path = dir.join(format!("{stem}.png"));
    let mut suffix = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{suffix}.png"));
        suffix += 1;
    }
    path
}

pub fn write_png(frame: CapturedFrame, path: &Path) -> CaptureResult<()> {
    let (width, height) = (frame.width, frame.height);
    let image = image::RgbaImage::from_raw(width, height, frame.data).ok_or_else(|| {
        CaptureError::Capture(format!("frame buffer does not match {width}x{height} RGBA"))
    })?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Captures the display under the cursor and writes it as PNG
pub struct ScreenshotTaker {
    screen: Arc<dyn ScreenSource>,
    context: Arc<SharedContext>,
    output_dir: PathBuf,
}

impl ScreenshotTaker {
    pub fn new(screen: Arc<dyn ScreenSource>, context: Arc<SharedContext>, output_dir: PathBuf) -> Self {
        Self {
            screen,
            context,
            output_dir,
        }
    }

    fn capture_blocking(
        screen: &dyn ScreenSource,
        cursor: Option<CursorPosition>,
        output_dir: &Path,
    ) -> CaptureResult<PathBuf> {
        let displays = screen.displays()?;
        let display = select_display(&displays, cursor).ok_or(CaptureError::NoDisplay)?;
        let frame = screen.capture(display)?;
        let path = screenshot_path(output_dir);
        write_png(frame, &path)?;
        Ok(path)
    }
}

#[async_trait]
impl Shutter for ScreenshotTaker {
    async fn fire(&self) {
        let screen = self.screen.clone();
        let cursor = self.context.cursor();
        let output_dir = self.output_dir.clone();

        let result = tokio::task::spawn_blocking(move || {
            Self::capture_blocking(screen.as_ref(), cursor, &output_dir)
        })
        .await;

        match result {
            Ok(Ok(path)) => tracing::debug!("Screenshot saved: {:?}", path),
            Ok(Err(e)) => tracing::warn!("Screenshot capture failed: {}", e),
            Err(e) => tracing::warn!("Screenshot worker join failed: {}", e),
        }
    }
}

pub struct ScreenshotScheduler {
    window: Duration,
    captures_per_window: usize,
    rng: StdRng,
}

impl ScreenshotScheduler {
    pub fn new(window: Duration, captures_per_window: usize) -> Self {
        Self::with_rng(window, captures_per_window, StdRng::from_entropy())
    }

    pub fn with_rng(window: Duration, captures_per_window: usize, rng: StdRng) -> Self {
        Self {
            window,
            captures_per_window,
            rng,
        }
    }

    pub async fn run(mut self, shutter: Arc<dyn Shutter>, cancel_token: CancellationToken) {
        tracing::info!(
            "Screenshot scheduler started ({} per {:?})",
            self.captures_per_window,
            self.window
        );

        'windows: loop {
            let window_start = Instant::now();
            let offsets = draw_offsets(&mut self.rng, self.window, self.captures_per_window);
            tracing::debug!("Next screenshot offsets: {:?}", offsets);

            for offset in offsets {
                if !sleep_until_or_cancel(window_start + offset, &cancel_token).await {
                    break 'windows;
                }
                shutter.fire().await;
            }

            if !sleep_until_or_cancel(window_start + self.window, &cancel_token).await {
                break;
            }
        }

        tracing::info!("Screenshot scheduler stopped");
    }
}

/// Returns false if the token fired first.
async fn sleep_until_or_cancel(deadline: Instant, cancel_token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => false,
        _ = tokio::time::sleep_until(deadline) => true,
    }
}
