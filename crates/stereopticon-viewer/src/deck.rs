//! Slide deck: ordered slides with wrap-around navigation.
//!
//! Slides are decoded eagerly at startup; a viewer holding a headset-style
//! stereo view should never hitch on a mid-session disk read.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbaImage;

/// One decoded slide.
pub struct Slide {
    pub name: String,
    pub image: RgbaImage,
}

/// Ordered slide collection with a current position.
pub struct SlideDeck {
    slides: Vec<Slide>,
    current: usize,
}

impl SlideDeck {
    /// Loads slides from `paths` in order. With no paths, the deck contains
    /// the generated test card so the viewer always has something to show.
    pub fn load(paths: &[PathBuf]) -> Result<SlideDeck> {
        if paths.is_empty() {
            return Ok(Self::from_slides(vec![Slide {
                name: "test card".to_string(),
                image: test_card(1024, 768),
            }]));
        }

        let mut slides = Vec::with_capacity(paths.len());
        for path in paths {
            let image = image::open(path)
                .with_context(|| format!("failed to load slide {}", path.display()))?
                .to_rgba8();

            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            log::debug!("slide '{name}': {}x{}", image.width(), image.height());
            slides.push(Slide { name, image });
        }

        Ok(Self::from_slides(slides))
    }

    /// Builds a deck from already-decoded slides. Panics on an empty vector
    /// in debug builds; `load` guarantees at least one slide.
    pub fn from_slides(slides: Vec<Slide>) -> SlideDeck {
        debug_assert!(!slides.is_empty());
        SlideDeck { slides, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Slide {
        &self.slides[self.current]
    }

    /// Advances to the next slide, wrapping at the end.
    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.slides.len();
    }

    /// Steps back to the previous slide, wrapping at the start.
    pub fn prev(&mut self) {
        self.current = (self.current + self.slides.len() - 1) % self.slides.len();
    }

    /// Jumps to the first slide.
    pub fn rewind(&mut self) {
        self.current = 0;
    }
}

/// Generated placeholder slide: horizontal/vertical gradient with a white
/// frame, so orientation and stereo alignment are visible at a glance.
pub fn test_card(width: u32, height: u32) -> RgbaImage {
    const BORDER: u32 = 8;

    RgbaImage::from_fn(width, height, |x, y| {
        let on_border =
            x < BORDER || y < BORDER || x >= width - BORDER || y >= height - BORDER;
        if on_border {
            image::Rgba([255, 255, 255, 255])
        } else {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            image::Rgba([r, g, 96, 255])
        }
    })
}
