/// Texture provider boundary with placeholder-then-swap loading
///
/// A texture handle is usable the moment it is requested. Until the host
/// reports the decoded image, the texture renders as a single placeholder
/// texel; afterwards the same handle resolves to the loaded image. Loading
/// itself happens outside this module (a worker thread, a browser `Image`),
/// so nothing here ever blocks a frame.
use std::path::PathBuf;

/// 1×1 RGBA texel shown while an image is still loading
pub const PLACEHOLDER_RGBA: [u8; 4] = [150, 20, 200, 255];

/// Opaque texture handle issued by a [`TextureProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

pub trait TextureProvider {
    /// Request a texture; returns immediately with a placeholder-backed handle.
    fn load_texture(&mut self, path: &str) -> TextureHandle;
}

/// Sampling setup chosen from the loaded image's dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerMode {
    /// Power-of-two image: generate mipmaps
    Mipmapped,
    /// Any other size: clamp to edge, linear filtering
    ClampLinear,
}

impl SamplerMode {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width.is_power_of_two() && height.is_power_of_two() {
            Self::Mipmapped
        } else {
            Self::ClampLinear
        }
    }
}

/// What a host reports once an image has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Average colour, used by renderers that shade per face
    pub mean_rgba: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureState {
    Placeholder,
    Ready {
        image: TextureImage,
        sampler: SamplerMode,
    },
}

#[derive(Debug)]
struct TextureEntry {
    path: PathBuf,
    state: TextureState,
}

/// Texture bookkeeping shared by the front ends.
///
/// Newly requested paths queue up until the host collects them with
/// [`TextureRegistry::take_pending`].
#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: Vec<TextureEntry>,
    pending: Vec<TextureHandle>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet handed to a loader, oldest first.
    pub fn take_pending(&mut self) -> Vec<(TextureHandle, PathBuf)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .filter_map(|handle| Some((handle, self.entry(handle)?.path.clone())))
            .collect()
    }

    /// Swap the placeholder for the decoded image.
    pub fn complete(&mut self, handle: TextureHandle, image: TextureImage) {
        let Some(entry) = self.entries.get_mut(handle.0 as usize) else {
            log::warn!("load finished for unknown {handle:?}");
            return;
        };
        let sampler = SamplerMode::for_dimensions(image.width, image.height);
        log::info!(
            "texture {} ready ({}x{}, {:?})",
            entry.path.display(),
            image.width,
            image.height,
            sampler
        );
        entry.state = TextureState::Ready { image, sampler };
    }

    /// Record a failed load. The handle keeps rendering the placeholder.
    pub fn fail(&mut self, handle: TextureHandle, reason: &str) {
        match self.entry(handle) {
            Some(entry) => log::warn!(
                "texture {} failed to load, keeping placeholder: {}",
                entry.path.display(),
                reason
            ),
            None => log::warn!("load failed for unknown {handle:?}: {reason}"),
        }
    }

    pub fn state(&self, handle: TextureHandle) -> Option<&TextureState> {
        self.entry(handle).map(|entry| &entry.state)
    }

    pub fn path(&self, handle: TextureHandle) -> Option<&PathBuf> {
        self.entry(handle).map(|entry| &entry.path)
    }

    pub fn is_ready(&self, handle: TextureHandle) -> bool {
        matches!(self.state(handle), Some(TextureState::Ready { .. }))
    }

    /// Colour a face-shading renderer should use for `handle` right now.
    pub fn color(&self, handle: TextureHandle) -> [u8; 4] {
        match self.state(handle) {
            Some(TextureState::Ready { image, .. }) => image.mean_rgba,
            _ => PLACEHOLDER_RGBA,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.entries.get(handle.0 as usize)
    }
}

impl TextureProvider for TextureRegistry {
    fn load_texture(&mut self, path: &str) -> TextureHandle {
        let handle = TextureHandle(self.entries.len() as u32);
        self.entries.push(TextureEntry {
            path: PathBuf::from(path),
            state: TextureState::Placeholder,
        });
        self.pending.push(handle);
        log::debug!("texture {path} requested as {handle:?}");
        handle
    }
}
