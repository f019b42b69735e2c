use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::foundation::error::{LottieError, LottieResult};
use crate::render::backend::FrameRGBA;

/// Pixel data in the layout display nodes consume: RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl Texture {
    /// Adopt a raster frame's buffer after checking it matches its dimensions.
    pub fn from_frame(frame: FrameRGBA) -> LottieResult<Self> {
        let expected = (frame.width as usize)
            .saturating_mul(frame.height as usize)
            .saturating_mul(4);
        if frame.data.len() != expected {
            return Err(LottieError::texture_decode(format!(
                "{}x{} frame carries {} bytes, expected {expected}",
                frame.width,
                frame.height,
                frame.data.len()
            )));
        }
        Ok(Self {
            width: frame.width,
            height: frame.height,
            data: frame.data,
            premultiplied: frame.premultiplied,
        })
    }

    /// Straight-alpha copy of the pixels (for encoders such as PNG).
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 {
                    px[..3].fill(0);
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        out
    }

    /// Straight RGBA of the pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        let single = Texture {
            width: 1,
            height: 1,
            data: px.to_vec(),
            premultiplied: self.premultiplied,
        };
        let straight = single.to_straight_rgba8();
        Some([straight[0], straight[1], straight[2], straight[3]])
    }
}

#[derive(Debug)]
struct NodeState {
    texture: Option<Arc<Texture>>,
    generation: u64,
    display_size: Option<(u32, u32)>,
    scale: f64,
}

/// The scene-graph node an animation draws into.
///
/// Handles are cheap clones of the same slot. The node owns its texture; publishers only swap the
/// reference, and each swap bumps [`DisplayNode::generation`].
#[derive(Clone, Debug)]
pub struct DisplayNode {
    state: Rc<RefCell<NodeState>>,
}

impl Default for DisplayNode {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayNode {
    /// Empty node at scale 1.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(NodeState {
                texture: None,
                generation: 0,
                display_size: None,
                scale: 1.0,
            })),
        }
    }

    /// Current texture.
    pub fn texture(&self) -> Option<Arc<Texture>> {
        self.state.borrow().texture.clone()
    }

    /// Number of textures published so far.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Size the node is displayed at, once set.
    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.state.borrow().display_size
    }

    /// Display scale.
    pub fn scale(&self) -> f64 {
        self.state.borrow().scale
    }

    /// Set the display scale.
    pub fn set_scale(&self, scale: f64) {
        self.state.borrow_mut().scale = scale;
    }

    /// Resize the node, keeping its scale.
    pub fn set_display_size(&self, width: u32, height: u32) {
        self.state.borrow_mut().display_size = Some((width, height));
    }

    pub(crate) fn replace_texture(&self, texture: Arc<Texture>) {
        let mut state = self.state.borrow_mut();
        state.texture = Some(texture);
        state.generation += 1;
    }

    /// Whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &DisplayNode) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/node.rs"]
mod tests;
