//! Scroll-driven page state: which navigation link is current, which
//! elements have been revealed and how far each skill bar has progressed.
//!
//! Nothing in this module talks to the browser. Geometry reads, DOM writes and
//! timers all go through [`Surface`], and deferred work comes back in as a
//! [`Task`] handed to [`Synchronizer::on_timer`].

mod config;
mod responders;
mod reveal;
mod runtime;
mod skills;
mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use config::MotionConfig;
pub use responders::{navbar_variant, parallax_transform, NavbarVariant};
pub use reveal::{RevealKind, Sighting};
pub use runtime::Runtime;
pub use skills::{parse_level, SkillSeed};
pub use tracker::{current_section, Span};

use reveal::RevealPhase;
use skills::SkillPhase;

/// An element the synchronizer can write to, by registry position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    NavMenu,
    Navbar,
    Hero,
    SkillsSection,
    NavLink(usize),
    Reveal(usize),
    Marker(usize),
    PackageItem(usize, usize),
    Skill(usize),
    SkillBar(usize),
}

/// Deferred work requested through [`Surface::schedule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Reveal(usize),
    Marker(usize),
    PackageItem(usize, usize),
    SkillStep(usize),
    SkillFill(usize),
    SkillViewportCheck,
    SkillFallback,
    SkillLoadCheck,
    NavResync,
}

/// The rendered page as the synchronizer sees it.
///
/// Writes addressed to an element that does not exist must be silent no-ops.
pub trait Surface {
    fn scroll_offset(&self) -> f64;

    /// Live `offsetTop`/`offsetHeight` of the section at `index`.
    fn section_span(&self, index: usize) -> Option<Span>;

    /// Whether the skills section's bounding box overlaps the viewport.
    fn skills_in_viewport(&self) -> bool;

    fn set_class(&mut self, node: Node, class: &str, on: bool);

    fn set_style(&mut self, node: Node, property: &str, value: &str);

    /// Makes sure the skill's level node starts with a percentage label.
    /// An existing label is kept as is.
    fn ensure_skill_label(&mut self, skill: usize, text: &str);

    fn unobserve(&mut self, node: Node);

    /// Smooth-scrolls to the element with `id`; false when there is none.
    fn scroll_into_view(&mut self, id: &str) -> bool;

    fn schedule(&mut self, task: Task, delay_ms: u32);

    fn cancel(&mut self, task: Task);

    fn trace(&mut self, _event: &str, _detail: &str) {}
}

/// Everything discovered in the document at startup, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    pub sections: Vec<String>,
    pub nav_links: Vec<Option<String>>,
    pub reveals: Vec<RevealKind>,
    pub skills: Vec<SkillSeed>,
}

pub struct Synchronizer {
    config: MotionConfig,
    registry: Registry,
    active_link: Option<usize>,
    menu_open: bool,
    reveal_phases: Vec<RevealPhase>,
    skill_phases: Vec<SkillPhase>,
}

impl Synchronizer {
    pub fn new(registry: Registry, config: MotionConfig) -> Self {
        let reveal_phases = vec![RevealPhase::Pending; registry.reveals.len()];
        let skill_phases = registry.skills.iter().map(SkillPhase::from_seed).collect();

        Self {
            config,
            registry,
            active_link: None,
            menu_open: false,
            reveal_phases,
            skill_phases,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn active_link(&self) -> Option<usize> {
        self.active_link
    }

    /// Script start: arms the unconditional skill fallback.
    pub fn start(&mut self, surface: &mut impl Surface) {
        if self.skills_pending() {
            surface.schedule(Task::SkillFallback, self.config.skill_fallback_ms);
        }
    }

    /// Document ready.
    pub fn on_ready(&mut self, surface: &mut impl Surface) {
        self.hide_package_items(surface);
        if self.skills_pending() {
            surface.schedule(Task::SkillViewportCheck, self.config.skill_viewport_check_ms);
        }
        self.sync_nav_links(surface);
    }

    /// Window load.
    pub fn on_load(&mut self, surface: &mut impl Surface) {
        if self.skills_pending() {
            surface.schedule(Task::SkillLoadCheck, self.config.skill_load_check_ms);
        }
    }

    pub fn on_scroll(&mut self, surface: &mut impl Surface) {
        self.restyle(surface);
        self.sync_nav_links(surface);
    }

    pub fn on_menu_toggle(&mut self, surface: &mut impl Surface) {
        self.menu_open = !self.menu_open;
        surface.set_class(Node::NavMenu, "active", self.menu_open);
    }

    pub fn on_nav_link_click(&mut self, surface: &mut impl Surface) {
        self.menu_open = false;
        surface.set_class(Node::NavMenu, "active", false);
    }

    /// Handles a click on an in-page anchor. Returns whether the default
    /// navigation should be prevented.
    pub fn on_anchor_click(&mut self, href: &str, surface: &mut impl Surface) -> bool {
        let Some(id) = href.strip_prefix('#') else {
            return false;
        };
        if id.is_empty() || id == "!" {
            return false;
        }

        if surface.scroll_into_view(id) {
            surface.schedule(Task::NavResync, self.config.nav_resync_ms);
        }
        true
    }

    pub fn on_timer(&mut self, task: Task, surface: &mut impl Surface) {
        match task {
            Task::Reveal(index) => self.reveal(index, surface),
            Task::Marker(index) => surface.set_class(Node::Marker(index), "animate", true),
            Task::PackageItem(category, item) => self.show_package_item(category, item, surface),
            Task::SkillStep(index) => self.skill_step(index, surface),
            Task::SkillFill(index) => self.skill_fill(index, surface),
            Task::SkillViewportCheck => {
                if surface.skills_in_viewport() {
                    self.run_skill_pass("viewport_check", surface);
                }
            }
            Task::SkillFallback => {
                if !self.any_skill_animated() {
                    self.run_skill_pass("fallback", surface);
                }
            }
            Task::SkillLoadCheck => {
                if !self.registry.skills.is_empty() && !self.any_skill_animated() {
                    self.run_skill_pass("load", surface);
                }
            }
            Task::NavResync => self.sync_nav_links(surface),
        }
    }

    /// Runs `task` now when `delay_ms` is zero, otherwise schedules it.
    fn after(&mut self, task: Task, delay_ms: u32, surface: &mut impl Surface) {
        if delay_ms == 0 {
            self.on_timer(task, surface);
        } else {
            surface.schedule(task, delay_ms);
        }
    }
}

fn stagger(position: usize, step_ms: u32) -> u32 {
    u32::try_from(position)
        .unwrap_or(u32::MAX)
        .saturating_mul(step_ms)
}

#[cfg(test)]
mod tests {
    use super::testing::FakeSurface;
    use super::*;

    fn page() -> (Synchronizer, FakeSurface) {
        let registry = Registry {
            sections: vec!["inicio".into(), "proyectos".into()],
            nav_links: vec![Some("inicio".into()), Some("proyectos".into())],
            ..Registry::default()
        };
        let surface = FakeSurface::new().with_sections(vec![
            ("inicio", Span::new(0.0, 800.0)),
            ("proyectos", Span::new(800.0, 800.0)),
        ]);
        (Synchronizer::new(registry, MotionConfig::default()), surface)
    }

    #[test]
    fn menu_toggles_and_closes_on_link_click() {
        let (mut sync, mut surface) = page();

        sync.on_menu_toggle(&mut surface);
        assert!(surface.has_class(Node::NavMenu, "active"));
        sync.on_menu_toggle(&mut surface);
        assert!(!surface.has_class(Node::NavMenu, "active"));

        sync.on_menu_toggle(&mut surface);
        sync.on_nav_link_click(&mut surface);
        assert!(!surface.has_class(Node::NavMenu, "active"));
        sync.on_menu_toggle(&mut surface);
        assert!(surface.has_class(Node::NavMenu, "active"));
    }

    #[test]
    fn anchor_click_scrolls_and_resyncs_later() {
        let (mut sync, mut surface) = page();
        sync.on_ready(&mut surface);
        assert_eq!(sync.active_link(), Some(0));

        assert!(sync.on_anchor_click("#proyectos", &mut surface));
        assert_eq!(surface.scrolled_to(), ["proyectos".to_string()]);

        surface.scroll_to(800.0);
        surface.advance(299, &mut sync);
        assert_eq!(sync.active_link(), Some(0));
        surface.advance(1, &mut sync);
        assert_eq!(sync.active_link(), Some(1));
    }

    #[test]
    fn placeholder_and_foreign_hrefs_keep_default_navigation() {
        let (mut sync, mut surface) = page();

        assert!(!sync.on_anchor_click("#", &mut surface));
        assert!(!sync.on_anchor_click("#!", &mut surface));
        assert!(!sync.on_anchor_click("https://example.com/#inicio", &mut surface));
        assert!(surface.scrolled_to().is_empty());
    }

    #[test]
    fn missing_anchor_target_still_prevents_default() {
        let (mut sync, mut surface) = page();

        assert!(sync.on_anchor_click("#nowhere", &mut surface));
        assert!(surface.scrolled_to().is_empty());
        assert_eq!(surface.pending_timers(), 0);
    }
}
