//! How a plot adapts to the space it is given.

use kurbo::Size;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizingPolicy {
    /// Always the plot's intrinsic size.
    Fixed,
    /// Fill the container, optionally keeping the intrinsic aspect ratio.
    FitContainer { preserve_aspect_ratio: bool },
}

impl Default for SizingPolicy {
    fn default() -> Self {
        SizingPolicy::FitContainer {
            preserve_aspect_ratio: true,
        }
    }
}

impl SizingPolicy {
    pub fn fit_container(preserve_aspect_ratio: bool) -> Self {
        SizingPolicy::FitContainer {
            preserve_aspect_ratio,
        }
    }

    /// Size to lay the plot out at. Without a usable container the intrinsic
    /// size is kept.
    pub fn plot_size(&self, intrinsic: Size, container: Option<Size>) -> Size {
        let container = match container {
            Some(c) if c.width > 0.0 && c.height > 0.0 => c,
            _ => return intrinsic,
        };
        match *self {
            SizingPolicy::Fixed => intrinsic,
            SizingPolicy::FitContainer {
                preserve_aspect_ratio: false,
            } => container,
            SizingPolicy::FitContainer {
                preserve_aspect_ratio: true,
            } => {
                if intrinsic.width <= 0.0 || intrinsic.height <= 0.0 {
                    return container;
                }
                let scale = (container.width / intrinsic.width).min(container.height / intrinsic.height);
                Size::new(intrinsic.width * scale, intrinsic.height * scale)
            }
        }
    }
}
