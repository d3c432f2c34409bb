//! In-memory image fixtures for upload checks

use std::io::Cursor;
use std::path::Path;

use image::{ImageOutputFormat, Rgba, RgbaImage};

use crate::error::SmokeResult;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// A valid 1x1 RGBA PNG
pub fn single_pixel_png() -> SmokeResult<Vec<u8>> {
    let pixel = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
    let mut bytes = Cursor::new(Vec::new());
    pixel.write_to(&mut bytes, ImageOutputFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Write the fixture to disk and read it back, as the upload sends file contents
pub fn write_fixture(path: &Path) -> SmokeResult<Vec<u8>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, single_pixel_png()?)?;
    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_single_pixel_png_decodes() {
        let bytes = single_pixel_png().unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (1, 1));
    }

    #[test]
    fn test_write_fixture_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/test_image.png");

        let bytes = write_fixture(&path).unwrap();
        assert!(path.exists());
        assert_eq!(bytes, single_pixel_png().unwrap());
    }
}
