use super::{Node, Surface, Synchronizer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavbarVariant {
    pub box_shadow: &'static str,
    pub transform: &'static str,
}

const NAVBAR_RESTING: NavbarVariant = NavbarVariant {
    box_shadow: "0 8px 32px rgba(0, 0, 0, 0.3)",
    transform: "translateX(-50%) scale(1)",
};

const NAVBAR_SCROLLED: NavbarVariant = NavbarVariant {
    box_shadow: "0 12px 40px rgba(0, 0, 0, 0.4)",
    transform: "translateX(-50%) scale(0.98)",
};

/// Navbar look for a scroll offset; strictly past `threshold` is "scrolled".
pub fn navbar_variant(scroll_offset: f64, threshold: f64) -> NavbarVariant {
    if scroll_offset > threshold {
        NAVBAR_SCROLLED
    } else {
        NAVBAR_RESTING
    }
}

/// Hero transform for a scroll offset. Unclamped.
pub fn parallax_transform(scroll_offset: f64, rate: f64) -> String {
    // `+ 0.0` folds -0 into 0
    let shift = scroll_offset * rate + 0.0;
    format!("translateY({shift}px)")
}

impl Synchronizer {
    pub(super) fn restyle(&mut self, surface: &mut impl Surface) {
        let offset = surface.scroll_offset();

        surface.set_style(
            Node::Hero,
            "transform",
            &parallax_transform(offset, self.config.parallax_rate),
        );

        let variant = navbar_variant(offset, self.config.navbar_threshold);
        surface.set_style(Node::Navbar, "box-shadow", variant.box_shadow);
        surface.set_style(Node::Navbar, "transform", variant.transform);
    }
}
