use super::{MotionConfig, Node, Surface, Synchronizer};

/// Vertical extent of a section in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

/// Id of the section that should be highlighted at `scroll_offset`.
///
/// Overlapping spans resolve to the last one in document order. Near the top
/// of the page the home section wins regardless of geometry.
pub fn current_section<'a>(
    scroll_offset: f64,
    sections: &[(&'a str, Span)],
    config: &'a MotionConfig,
) -> Option<&'a str> {
    let position = scroll_offset + config.nav_lookahead;

    if position < config.home_threshold {
        return Some(config.home_section.as_str());
    }

    sections
        .iter()
        .filter(|(_, span)| span.contains(position))
        .last()
        .map(|(id, _)| *id)
}

impl Synchronizer {
    pub(super) fn sync_nav_links(&mut self, surface: &mut impl Surface) {
        let spans: Vec<(&str, Span)> = self
            .registry
            .sections
            .iter()
            .enumerate()
            .filter_map(|(index, id)| Some((id.as_str(), surface.section_span(index)?)))
            .collect();

        let current = current_section(surface.scroll_offset(), &spans, &self.config);
        let active = current.and_then(|current| {
            self.registry
                .nav_links
                .iter()
                .position(|target| target.as_deref() == Some(current))
        });

        for index in 0..self.registry.nav_links.len() {
            surface.set_class(Node::NavLink(index), "active", Some(index) == active);
        }
        self.active_link = active;
    }
}
