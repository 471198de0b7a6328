use anyhow::{Context, Result};
use image::DynamicImage;
use lru::LruCache;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Longest edge album art is scaled down to before caching.
pub const ART_SIZE: u32 = 320;

/// Downloads and caches cover images by URL
pub struct AlbumArtCache {
    cache_dir: PathBuf,
    /// In-memory LRU cache of loaded images (bounded to prevent memory exhaustion)
    images: LruCache<String, DynamicImage>,
    /// Protocol handler for rendering images
    picker: Option<Picker>,
    /// URL behind `current_protocol`
    current_url: Option<String>,
    current_protocol: Option<Box<dyn StatefulProtocol>>,
}

impl AlbumArtCache {
    /// Create a new album art cache with specified capacity
    pub fn new(capacity: usize) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .context("Failed to get cache directory")?
            .join("athena")
            .join("album-art");

        std::fs::create_dir_all(&cache_dir)
            .context("Failed to create album art cache directory")?;

        // Try to get font size from terminal, fallback to default if it fails
        let mut picker = Picker::from_termios()
            .ok()
            .or_else(|| Some(Picker::new((8, 16))));

        if let Some(ref mut p) = picker {
            let _ = p.guess_protocol();
        }

        let cap = NonZeroUsize::new(capacity.max(10)).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            cache_dir,
            images: LruCache::new(cap),
            picker,
            current_url: None,
            current_protocol: None,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Simple hash function for URLs to create safe filenames
    fn hash_url(url: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    fn cache_path(cache_dir: &Path, url: &str) -> PathBuf {
        cache_dir.join(format!("{}_{}.jpg", Self::hash_url(url), ART_SIZE))
    }

    /// Load from the disk cache or download. Takes no `&self` so it can run
    /// on a spawned task; hand the result to [`insert`](Self::insert).
    pub async fn fetch(cache_dir: PathBuf, url: String) -> Result<DynamicImage> {
        let cache_path = Self::cache_path(&cache_dir, &url);

        if cache_path.exists() {
            return image::open(&cache_path).context("Failed to load cached album art");
        }

        let response = reqwest::get(&url)
            .await
            .context("Failed to download album art")?
            .error_for_status()
            .context("Album art request failed")?;

        let bytes = response
            .bytes()
            .await
            .context("Failed to read album art bytes")?;

        let mut img = image::load_from_memory(&bytes).context("Failed to decode album art")?;
        if img.width() > ART_SIZE || img.height() > ART_SIZE {
            img = img.thumbnail(ART_SIZE, ART_SIZE);
        }

        std::fs::write(&cache_path, &bytes).context("Failed to write album art to cache")?;

        Ok(img)
    }

    pub fn insert(&mut self, url: String, image: DynamicImage) {
        if self.current_url.as_deref() == Some(url.as_str()) {
            self.current_protocol = None;
        }
        self.images.put(url, image);
    }

    pub fn has_cached(&self, url: &str) -> bool {
        self.images.contains(url)
    }

    /// Make `url` the image being drawn. False when it isn't loaded yet.
    pub fn set_current(&mut self, url: &str) -> bool {
        if self.current_url.as_deref() == Some(url) && self.current_protocol.is_some() {
            return true;
        }

        let Some(image) = self.images.get(url) else {
            return false;
        };
        let Some(ref mut picker) = self.picker else {
            return false;
        };

        self.current_protocol = Some(picker.new_resize_protocol(image.clone()));
        self.current_url = Some(url.to_string());
        true
    }

    /// Get the current protocol for rendering
    pub fn get_protocol_mut(&mut self) -> Option<&mut Box<dyn StatefulProtocol>> {
        self.current_protocol.as_mut()
    }

    /// Check if graphics are supported
    pub fn is_supported(&self) -> bool {
        self.picker.is_some()
    }

    /// Clear the in-memory cache (keeps disk cache)
    pub fn clear_memory_cache(&mut self) {
        self.images.clear();
        self.current_url = None;
        self.current_protocol = None;
    }
}
