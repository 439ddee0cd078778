use super::{stagger, Node, Surface, Synchronizer, Task};

const REVEAL_CLASS: &str = "fade-in-up";
const SCROLL_REVEAL_CLASS: &str = "animated";
const MARKER_CLASS: &str = "animate";

/// How a tracked element reveals itself once it scrolls into view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealKind {
    /// Project card; cards entering together are staggered.
    Card,
    Plain,
    /// Timeline card; `marker` is whether its timeline item has a marker.
    Experience { marker: bool },
    /// Package category with `items` package entries that slide in after it.
    PackageCategory { items: usize },
    /// Generic `.animate-on-scroll` element, watched with a wider margin.
    OnScroll,
}

impl RevealKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::OnScroll => SCROLL_REVEAL_CLASS,
            _ => REVEAL_CLASS,
        }
    }
}

/// One entry of an intersection batch, by position in `Registry::reveals`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sighting {
    pub index: usize,
    pub intersecting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RevealPhase {
    Pending,
    Scheduled,
    Revealed,
}

impl Synchronizer {
    /// Handles one batch delivered by an intersection observer.
    pub fn on_intersect(&mut self, batch: &[Sighting], surface: &mut impl Surface) {
        for (position, sighting) in batch.iter().enumerate() {
            if !sighting.intersecting {
                continue;
            }
            let Some(kind) = self.registry.reveals.get(sighting.index).copied() else {
                continue;
            };
            if self.reveal_phases[sighting.index] != RevealPhase::Pending {
                continue;
            }

            surface.unobserve(Node::Reveal(sighting.index));
            self.reveal_phases[sighting.index] = RevealPhase::Scheduled;

            let delay = match kind {
                RevealKind::Card => stagger(position, self.config.card_stagger_ms),
                _ => 0,
            };
            self.after(Task::Reveal(sighting.index), delay, surface);
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.reveal_phases.get(index) == Some(&RevealPhase::Revealed)
    }

    pub(super) fn reveal(&mut self, index: usize, surface: &mut impl Surface) {
        let Some(kind) = self.registry.reveals.get(index).copied() else {
            return;
        };
        if self.reveal_phases[index] == RevealPhase::Revealed {
            return;
        }

        self.reveal_phases[index] = RevealPhase::Revealed;
        surface.set_class(Node::Reveal(index), kind.class(), true);

        match kind {
            RevealKind::Experience { marker: true } => {
                surface.schedule(Task::Marker(index), self.config.marker_delay_ms);
            }
            RevealKind::PackageCategory { items } => {
                for item in 0..items {
                    let delay = stagger(item, self.config.package_item_stagger_ms);
                    self.after(Task::PackageItem(index, item), delay, surface);
                }
            }
            _ => {}
        }
    }

    pub(super) fn show_package_item(&mut self, category: usize, item: usize, surface: &mut impl Surface) {
        let node = Node::PackageItem(category, item);
        surface.set_style(node, "opacity", "1");
        surface.set_style(node, "transform", "translateX(0)");
        surface.set_style(node, "transition", "all 0.6s ease");
    }

    /// Puts package items of categories that have not been revealed yet in
    /// their pre-animation position.
    pub(super) fn hide_package_items(&mut self, surface: &mut impl Surface) {
        for (index, kind) in self.registry.reveals.iter().enumerate() {
            let RevealKind::PackageCategory { items } = *kind else {
                continue;
            };
            if self.reveal_phases[index] != RevealPhase::Pending {
                continue;
            }

            for item in 0..items {
                let node = Node::PackageItem(index, item);
                surface.set_style(node, "opacity", "0");
                surface.set_style(node, "transform", "translateX(-20px)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::testing::FakeSurface;
    use crate::motion::{MotionConfig, Registry};

    fn board(reveals: Vec<RevealKind>) -> (Synchronizer, FakeSurface) {
        let registry = Registry {
            reveals,
            ..Registry::default()
        };
        (
            Synchronizer::new(registry, MotionConfig::default()),
            FakeSurface::new(),
        )
    }

    fn seen(index: usize) -> Sighting {
        Sighting {
            index,
            intersecting: true,
        }
    }

    fn unseen(index: usize) -> Sighting {
        Sighting {
            index,
            intersecting: false,
        }
    }

    #[test]
    fn element_that_never_intersects_is_never_touched() {
        let (mut sync, mut surface) = board(vec![RevealKind::Plain, RevealKind::Card]);

        sync.on_intersect(&[unseen(0), unseen(1)], &mut surface);
        surface.advance(5_000, &mut sync);

        assert!(surface.writes_to(Node::Reveal(0)).is_empty());
        assert!(surface.writes_to(Node::Reveal(1)).is_empty());
        assert!(!surface.unobserved(Node::Reveal(0)));
    }

    #[test]
    fn repeated_intersections_reveal_once() {
        let (mut sync, mut surface) = board(vec![RevealKind::Plain]);

        sync.on_intersect(&[seen(0)], &mut surface);
        sync.on_intersect(&[seen(0)], &mut surface);
        sync.on_intersect(&[unseen(0), seen(0)], &mut surface);

        assert!(surface.has_class(Node::Reveal(0), "fade-in-up"));
        assert_eq!(surface.writes_to(Node::Reveal(0)).len(), 1);
        assert!(surface.unobserved(Node::Reveal(0)));
        assert!(sync.is_revealed(0));
    }

    #[test]
    fn cards_in_one_batch_are_staggered_by_batch_position() {
        let (mut sync, mut surface) = board(vec![RevealKind::Card; 4]);

        sync.on_intersect(&[seen(2), unseen(3), seen(0), seen(1)], &mut surface);

        assert!(surface.has_class(Node::Reveal(2), "fade-in-up"));
        assert!(!surface.has_class(Node::Reveal(0), "fade-in-up"));

        surface.advance(399, &mut sync);
        assert!(!surface.has_class(Node::Reveal(0), "fade-in-up"));
        surface.advance(1, &mut sync);
        assert!(surface.has_class(Node::Reveal(0), "fade-in-up"));
        assert!(!surface.has_class(Node::Reveal(1), "fade-in-up"));
        surface.advance(200, &mut sync);
        assert!(surface.has_class(Node::Reveal(1), "fade-in-up"));
        assert!(!surface.has_class(Node::Reveal(3), "fade-in-up"));
    }

    #[test]
    fn scheduled_card_is_not_rescheduled_by_a_second_batch() {
        let (mut sync, mut surface) = board(vec![RevealKind::Card; 2]);

        sync.on_intersect(&[seen(0), seen(1)], &mut surface);
        sync.on_intersect(&[seen(1)], &mut surface);
        surface.advance(1_000, &mut sync);

        assert_eq!(surface.writes_to(Node::Reveal(1)).len(), 1);
    }

    #[test]
    fn scroll_elements_use_their_own_class() {
        let (mut sync, mut surface) = board(vec![RevealKind::OnScroll]);

        sync.on_intersect(&[seen(0)], &mut surface);

        assert!(surface.has_class(Node::Reveal(0), "animated"));
        assert!(!surface.has_class(Node::Reveal(0), "fade-in-up"));
    }

    #[test]
    fn element_registered_as_reveal_and_scroll_target_gets_both_classes() {
        // Entries 0 and 1 are the same element as seen by the reveal and the
        // scroll observers.
        let (mut sync, mut surface) = board(vec![RevealKind::Plain, RevealKind::OnScroll]);

        sync.on_intersect(&[seen(1)], &mut surface);
        sync.on_intersect(&[seen(0)], &mut surface);

        assert!(surface.has_class(Node::Reveal(0), "fade-in-up"));
        assert!(surface.has_class(Node::Reveal(1), "animated"));
        assert!(surface.unobserved(Node::Reveal(0)));
        assert!(surface.unobserved(Node::Reveal(1)));
    }

    #[test]
    fn experience_marker_follows_after_delay() {
        let (mut sync, mut surface) = board(vec![
            RevealKind::Experience { marker: true },
            RevealKind::Experience { marker: false },
        ]);

        sync.on_intersect(&[seen(0), seen(1)], &mut surface);
        surface.advance(299, &mut sync);
        assert!(!surface.has_class(Node::Marker(0), "animate"));
        surface.advance(1, &mut sync);
        assert!(surface.has_class(Node::Marker(0), "animate"));
        assert!(surface.writes_to(Node::Marker(1)).is_empty());
    }

    #[test]
    fn package_items_slide_in_one_after_another() {
        let (mut sync, mut surface) = board(vec![RevealKind::PackageCategory { items: 3 }]);

        sync.on_ready(&mut surface);
        assert_eq!(surface.style(Node::PackageItem(0, 2), "opacity"), Some("0"));
        assert_eq!(
            surface.style(Node::PackageItem(0, 2), "transform"),
            Some("translateX(-20px)")
        );

        sync.on_intersect(&[seen(0)], &mut surface);
        assert_eq!(surface.style(Node::PackageItem(0, 0), "opacity"), Some("1"));
        assert_eq!(surface.style(Node::PackageItem(0, 1), "opacity"), Some("0"));

        surface.advance(100, &mut sync);
        assert_eq!(surface.style(Node::PackageItem(0, 1), "opacity"), Some("1"));
        assert_eq!(surface.style(Node::PackageItem(0, 2), "opacity"), Some("0"));

        surface.advance(100, &mut sync);
        assert_eq!(surface.style(Node::PackageItem(0, 2), "transform"), Some("translateX(0)"));
        assert_eq!(
            surface.style(Node::PackageItem(0, 2), "transition"),
            Some("all 0.6s ease")
        );
    }

    #[test]
    fn late_ready_does_not_hide_revealed_items() {
        let (mut sync, mut surface) = board(vec![RevealKind::PackageCategory { items: 1 }]);

        sync.on_intersect(&[seen(0)], &mut surface);
        sync.on_ready(&mut surface);

        assert_eq!(surface.style(Node::PackageItem(0, 0), "opacity"), Some("1"));
    }

    #[test]
    fn unknown_indices_are_ignored() {
        let (mut sync, mut surface) = board(vec![RevealKind::Plain]);

        sync.on_intersect(&[seen(7)], &mut surface);

        assert!(surface.writes_to(Node::Reveal(7)).is_empty());
        assert!(!sync.is_revealed(7));
    }
}
