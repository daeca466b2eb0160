/// Background texture decoding for the terminal front end.
///
/// Each pending request from the [`TextureRegistry`] is decoded on its own
/// thread with the `image` crate. The render loop polls for results at the
/// top of each frame, so a placeholder is swapped for the real colour
/// between frames and never mid-draw.
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use pong3d_core::{TextureHandle, TextureImage, TextureRegistry};

type LoadResult = (TextureHandle, Result<TextureImage>);

pub struct TextureLoader {
    assets_root: PathBuf,
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    in_flight: usize,
}

impl TextureLoader {
    /// Paths requested by the scene are resolved against `assets_root`.
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        let (sender, receiver) = channel();
        Self {
            assets_root: assets_root.into(),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Start a decode for every request the registry has queued.
    pub fn dispatch(&mut self, registry: &mut TextureRegistry) {
        for (handle, path) in registry.take_pending() {
            let full_path = self.assets_root.join(&path);
            let sender = self.sender.clone();
            self.in_flight += 1;
            thread::spawn(move || {
                let result = decode(&full_path);
                // The loop may already have exited; nobody is left to tell.
                let _ = sender.send((handle, result));
            });
        }
    }

    /// Swap in whatever finished since the last call. Never blocks.
    pub fn apply(&mut self, registry: &mut TextureRegistry) {
        while let Ok((handle, result)) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match result {
                Ok(image) => registry.complete(handle, image),
                Err(err) => registry.fail(handle, &format!("{err:#}")),
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Decode an image file and reduce it to its size and average colour.
pub fn decode(path: &Path) -> Result<TextureImage> {
    let rgba = image::open(path)
        .with_context(|| format!("failed to open texture {}", path.display()))?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureImage {
        width,
        height,
        mean_rgba: mean_color(rgba.as_raw()),
    })
}

/// Channel-wise mean of tightly packed RGBA bytes.
fn mean_color(rgba: &[u8]) -> [u8; 4] {
    let pixels = (rgba.len() / 4) as u64;
    if pixels == 0 {
        return [0, 0, 0, 255];
    }
    let mut sums = [0u64; 4];
    for texel in rgba.chunks_exact(4) {
        for (sum, &channel) in sums.iter_mut().zip(texel) {
            *sum += u64::from(channel);
        }
    }
    sums.map(|sum| (sum / pixels) as u8)
}
