//! Screen capture orchestration
//!
//! The actual pixel grab and resize are delegated to a [`ScreenGrabber`];
//! this module owns where images land, the post-resize size ceiling, and
//! the retention policy for saved captures.

mod macos;

use anyhow::{bail, Context, Result};
use chrono::Local;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::{CaptureFormat, ImageConfig};

pub use macos::MacScreenGrabber;

/// Hard ceiling on the resized image; exceeding it fails the whole attempt
pub const MAX_IMAGE_BYTES: u64 = 3 * 1024 * 1024;

/// External OS-level capture adapter
pub trait ScreenGrabber {
    /// Capture the full screen as PNG into `raw_png`.
    fn grab(&self, raw_png: &Path) -> Result<()>;

    /// Re-encode `raw_png` into `out`, bounded by `max_width`.
    fn resize(&self, raw_png: &Path, out: &Path, max_width: u32, format: CaptureFormat)
        -> Result<()>;
}

#[derive(Debug)]
pub struct CaptureResult {
    /// Exact bytes of the final resized image
    pub bytes: Vec<u8>,
    /// Displays covered by the grab; the adapter captures the main display
    pub display_count: u32,
    /// Human-readable `WxH` of the final image
    pub resolution: String,
    pub image_path: PathBuf,
    /// True when the image lives in scratch space and the caller must
    /// remove it after use
    pub cleanup_required: bool,
}

/// Removes a scratch file when dropped, on every exit path
pub struct ScratchGuard {
    path: PathBuf,
}

impl ScratchGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Default directory for saved captures (`~/.vigil/imgs`)
pub fn default_save_dir() -> Result<PathBuf> {
    Ok(crate::config::data_dir()?.join("imgs"))
}

/// Run one capture: grab, resize, enforce the size ceiling, and apply the
/// retention policy. Any grab/resize/ceiling failure aborts the attempt;
/// retention failures are only warnings.
pub fn capture(
    image: &ImageConfig,
    grabber: &dyn ScreenGrabber,
    save_dir: &Path,
    scratch_dir: &Path,
) -> Result<CaptureResult> {
    let cleanup_required = !image.save_images;
    let out_dir = if image.save_images {
        fs::create_dir_all(save_dir)
            .with_context(|| format!("create image dir {}", save_dir.display()))?;
        save_dir
    } else {
        scratch_dir
    };

    let raw_path = scratch_dir.join(format!("vigil-raw-{}.png", Uuid::new_v4()));
    grabber.grab(&raw_path).context("screen grab failed")?;
    let _raw = ScratchGuard::new(raw_path.clone());

    // zero-padded local timestamp keeps lexicographic order chronological,
    // which the retention pass below relies on
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let out_path = out_dir.join(format!("screenshot-{}.{}", timestamp, image.format.extension()));

    grabber
        .resize(&raw_path, &out_path, image.max_width, image.format)
        .context("resize failed")?;

    let size = fs::metadata(&out_path)
        .with_context(|| format!("stat resized image {}", out_path.display()))?
        .len();
    if size > MAX_IMAGE_BYTES {
        let _ = fs::remove_file(&out_path);
        bail!("image too large after resize: {size} bytes");
    }

    let bytes = fs::read(&out_path)
        .with_context(|| format!("read resized image {}", out_path.display()))?;

    let (width, height) = image::ImageReader::new(std::io::Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .context("inspect resized image")?
        .into_dimensions()
        .context("decode resized image dimensions")?;

    if image.save_images && image.max_files > 0 {
        if let Err(err) = prune_saved_images(out_dir, image.max_files) {
            warn!("failed to clean up old captures: {err:#}");
        }
    }

    Ok(CaptureResult {
        bytes,
        display_count: 1,
        resolution: format!("{width}x{height}"),
        image_path: out_path,
        cleanup_required,
    })
}

/// Delete the oldest saved captures beyond `max_files`. Filenames embed a
/// sortable timestamp, so lexicographic order is chronological.
fn prune_saved_images(dir: &Path, max_files: usize) -> Result<()> {
    let pattern = dir.join("screenshot-*").to_string_lossy().into_owned();

    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("jpg") | Some("jpeg") | Some("png")
            )
        })
        .collect();
    files.sort();

    if files.len() <= max_files {
        return Ok(());
    }

    let excess = files.len() - max_files;
    for path in files.drain(..excess) {
        if let Err(err) = fs::remove_file(&path) {
            warn!("failed to delete old capture {}: {err}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Grabber that writes a canned image instead of touching the screen
    struct FakeGrabber {
        resized_bytes: Vec<u8>,
    }

    impl FakeGrabber {
        fn with_png() -> Self {
            Self {
                resized_bytes: tiny_png(),
            }
        }
    }

    impl ScreenGrabber for FakeGrabber {
        fn grab(&self, raw_png: &Path) -> Result<()> {
            fs::write(raw_png, tiny_png())?;
            Ok(())
        }

        fn resize(
            &self,
            _raw_png: &Path,
            out: &Path,
            _max_width: u32,
            _format: CaptureFormat,
        ) -> Result<()> {
            fs::write(out, &self.resized_bytes)?;
            Ok(())
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn image_config(save_images: bool) -> ImageConfig {
        ImageConfig {
            max_width: 1280,
            max_files: 100,
            save_images,
            format: CaptureFormat::Png,
        }
    }

    #[test]
    fn test_capture_to_scratch_sets_cleanup_flag() {
        let scratch = tempfile::tempdir().unwrap();
        let save = tempfile::tempdir().unwrap();
        let grabber = FakeGrabber::with_png();

        let result = capture(&image_config(false), &grabber, save.path(), scratch.path()).unwrap();

        assert!(result.cleanup_required);
        assert!(result.image_path.starts_with(scratch.path()));
        assert_eq!(result.resolution, "2x3");
        assert_eq!(result.bytes, tiny_png());
        // raw scratch file is already gone
        let leftovers: Vec<_> = fs::read_dir(scratch.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("vigil-raw-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_capture_saves_into_image_dir() {
        let scratch = tempfile::tempdir().unwrap();
        let save = tempfile::tempdir().unwrap();
        let grabber = FakeGrabber::with_png();

        let result = capture(&image_config(true), &grabber, save.path(), scratch.path()).unwrap();

        assert!(!result.cleanup_required);
        assert!(result.image_path.starts_with(save.path()));
        assert!(result.image_path.exists());
    }

    #[test]
    fn test_oversize_image_fails_the_attempt() {
        let scratch = tempfile::tempdir().unwrap();
        let save = tempfile::tempdir().unwrap();
        let grabber = FakeGrabber {
            resized_bytes: vec![0u8; (MAX_IMAGE_BYTES + 1) as usize],
        };

        let err = capture(&image_config(false), &grabber, save.path(), scratch.path())
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_retention_keeps_newest_files() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=5 {
            let name = format!("screenshot-202501{day:02}-120000.jpg");
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        // non-matching files are untouched
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        prune_saved_images(dir.path(), 2).unwrap();

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "notes.txt".to_string(),
                "screenshot-20250104-120000.jpg".to_string(),
                "screenshot-20250105-120000.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_retention_under_limit_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("screenshot-20250101-120000.png"), b"x").unwrap();

        prune_saved_images(dir.path(), 2).unwrap();

        assert!(dir.path().join("screenshot-20250101-120000.png").exists());
    }

    #[test]
    fn test_scratch_guard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.png");
        fs::write(&path, b"x").unwrap();

        {
            let _guard = ScratchGuard::new(path.clone());
        }

        assert!(!path.exists());
    }
}
