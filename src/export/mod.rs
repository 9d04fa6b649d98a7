//! Export pipeline: live scene to a downloadable PNG
//!
//! 1. serialize the scene to SVG markup (synchronous, at call time)
//! 2. decode the markup into a tree (the only suspension point)
//! 3. draw the tree onto the fixed export surface and encode it as PNG
//! 4. bind the result to the download link, preview and favicon
//!
//! Exports may overlap. Whichever finishes last is what the surface shows,
//! independent of the order they were started in. A failed export changes
//! nothing on the surface.

pub mod decoder;

pub use decoder::{DecoderOptions, SceneDecoder, SvgDecoder};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine as _;
use log::{info, warn};
use sha2::{Digest, Sha256};

use crate::rendering::{raster, Scene, Screenshot};
use crate::{ExportSize, Result};

/// Name used when the text yields no usable slug
const FALLBACK_SLUG: &str = "collage";

/// The product of one export
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Text-derived name without extension
    pub slug: String,
    pub filename: String,
    /// `data:` URI of the PNG
    pub href: String,
    /// Issue order of the export request, starting at 1
    pub sequence: u64,
}

impl ExportArtifact {
    fn new(shot: Screenshot, slug: String, sequence: u64) -> Self {
        let href = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&shot.png_data)
        );
        Self {
            filename: format!("{}.png", slug),
            slug,
            href,
            width: shot.width,
            height: shot.height,
            png: shot.png_data,
            sequence,
        }
    }

    /// SHA-256 of the PNG bytes, hex encoded
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png))
    }
}

#[derive(Default)]
struct SurfaceState {
    bound: Option<Arc<ExportArtifact>>,
    binds: usize,
}

/// The download link, result preview and favicon an export updates
///
/// All three always show the same artifact.
#[derive(Default)]
pub struct ExportSurface {
    state: Mutex<SurfaceState>,
}

impl ExportSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind(&self, artifact: Arc<ExportArtifact>) {
        let mut state = self.lock();
        if let Some(prev) = &state.bound {
            if prev.sequence > artifact.sequence {
                warn!(
                    "export #{} finished after #{}; showing #{}",
                    artifact.sequence, prev.sequence, artifact.sequence
                );
            }
        }
        info!(
            "export #{} bound as {} ({})",
            artifact.sequence,
            artifact.filename,
            &artifact.digest()[..12]
        );
        state.bound = Some(artifact);
        state.binds += 1;
    }

    /// The artifact currently on display
    pub fn current(&self) -> Option<Arc<ExportArtifact>> {
        self.lock().bound.clone()
    }

    /// Whether the result section has anything to show
    pub fn is_visible(&self) -> bool {
        self.lock().bound.is_some()
    }

    /// `(href, download filename)`
    pub fn download_link(&self) -> Option<(String, String)> {
        self.current().map(|a| (a.href.clone(), a.filename.clone()))
    }

    pub fn preview_href(&self) -> Option<String> {
        self.current().map(|a| a.href.clone())
    }

    pub fn favicon_href(&self) -> Option<String> {
        self.preview_href()
    }

    /// How many exports have been bound so far
    pub fn bind_count(&self) -> usize {
        self.lock().binds
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone)]
pub struct ExportPipeline {
    decoder: Arc<dyn SceneDecoder>,
    size: ExportSize,
    slug_max_len: usize,
    surface: Arc<ExportSurface>,
    issued: Arc<AtomicU64>,
}

impl ExportPipeline {
    pub fn new(decoder: Arc<dyn SceneDecoder>, size: ExportSize, slug_max_len: usize) -> Self {
        Self {
            decoder,
            size,
            slug_max_len,
            surface: Arc::new(ExportSurface::new()),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn surface(&self) -> &Arc<ExportSurface> {
        &self.surface
    }

    pub fn size(&self) -> ExportSize {
        self.size
    }

    /// Export the scene as it is right now
    ///
    /// The markup is captured before this returns, so later scene changes do
    /// not leak into an export already in flight.
    pub fn export_image(&self, scene: &Scene) -> impl Future<Output = Result<Arc<ExportArtifact>>> + Send + 'static {
        self.export_markup(scene.to_svg(), scene.text())
    }

    /// Export already serialized markup, naming the file after `text`
    pub fn export_markup(
        &self,
        markup: String,
        text: &str,
    ) -> impl Future<Output = Result<Arc<ExportArtifact>>> + Send + 'static {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let slug = slugify(text, self.slug_max_len);
        let decode = self.decoder.decode(markup);
        let size = self.size;
        let surface = Arc::clone(&self.surface);

        async move {
            let tree = decode.await.map_err(|e| {
                warn!("export #{} failed: {}", sequence, e);
                e
            })?;
            let shot = raster::rasterize(&tree, size)?;
            let artifact = Arc::new(ExportArtifact::new(shot, slug, sequence));
            surface.bind(Arc::clone(&artifact));
            Ok(artifact)
        }
    }
}

/// File-name slug: lower-case words joined by hyphens
///
/// Punctuation and whitespace separate words, apostrophes are dropped inside
/// words and a lower-to-upper case change starts a new word. The result is
/// cut at a word boundary to at most `max_len` characters.
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut prev: Option<char> = None;

    for ch in text.chars() {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_alphanumeric() {
            if let Some(p) = prev {
                if p.is_lowercase() && ch.is_uppercase() && !cur.is_empty() {
                    words.push(std::mem::take(&mut cur));
                }
            }
            cur.extend(ch.to_lowercase());
        } else if !cur.is_empty() {
            words.push(std::mem::take(&mut cur));
        }
        prev = Some(ch);
    }
    if !cur.is_empty() {
        words.push(cur);
    }

    let mut slug = String::new();
    for word in words {
        let extra = if slug.is_empty() { 0 } else { 1 };
        if slug.chars().count() + extra + word.chars().count() > max_len {
            if slug.is_empty() {
                slug = word.chars().take(max_len).collect();
            }
            break;
        }
        if extra == 1 {
            slug.push('-');
        }
        slug.push_str(&word);
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
