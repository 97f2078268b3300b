// tests/common/mod.rs
//
// Common test utilities: image fixtures and ground-truth files in a temp directory.

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// PNG bytes of a `width` x `height` grayscale gradient
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| Luma([((x + y) % 256) as u8]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

/// Bytes no codec accepts
pub fn corrupt_bytes() -> Vec<u8> {
    b"\x89PNG\r\n\x1a\n-- truncated garbage --".to_vec()
}

/// Temp layout: `<root>/images/...`, `<root>/gt.txt`, `<root>/lmdb`
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("images")).expect("images dir");
        Self { dir }
    }

    pub fn images(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    pub fn gt_file(&self) -> PathBuf {
        self.dir.path().join("gt.txt")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("lmdb")
    }

    /// Write `bytes` to `images/<name>` and return the full path
    pub fn add_image(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.images().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("image parent dir");
        }
        fs::write(&path, bytes).expect("write image");
        path
    }

    /// Write the ground-truth file verbatim from `lines`, newline-terminated
    pub fn write_gt(&self, lines: &[&str]) {
        let mut text = lines.join("\n");
        text.push('\n');
        fs::write(self.gt_file(), text).expect("write gt");
    }

    pub fn error_log(&self) -> PathBuf {
        self.output().join("error_image_log.txt")
    }
}

pub fn read_file(path: &Path) -> Vec<u8> {
    fs::read(path).expect("read file")
}
