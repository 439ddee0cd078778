use crate::log::{LogLevel, Logger};
use crate::motion::{parse_level, Node, Registry, RevealKind, SkillSeed, Span, Surface, Task};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, HtmlElement, IntersectionObserver, NodeList, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

const SECTION_SELECTOR: &str = "section[id], footer[id]";
const NAV_LINK_SELECTOR: &str = ".nav-link";
const REVEAL_SELECTOR: &str = ".about-card, .skill-category, .cta-content, .cta-features, \
     .experience-card, .project-card, .contact-card, .package-category";
const SCROLL_REVEAL_SELECTOR: &str = ".animate-on-scroll";
const SKILL_ITEM_SELECTOR: &str = ".skill-item";
const SKILL_LABEL_CLASS: &str = "skill-percentage";

/// Handles for everything in [`Registry`], index for index. Missing optional
/// pieces are `None`.
pub struct Elements {
    sections: Vec<Element>,
    nav_links: Vec<Element>,
    reveals: Vec<Element>,
    reveal_kinds: Vec<RevealKind>,
    markers: Vec<Option<Element>>,
    package_items: Vec<Vec<Element>>,
    skill_items: Vec<Element>,
    skill_bars: Vec<Option<Element>>,
    skill_levels: Vec<Option<Element>>,
    pub skills_section: Option<Element>,
    pub nav_menu: Option<Element>,
    pub nav_toggle: Option<Element>,
    navbar: Option<Element>,
    hero: Option<Element>,
}

impl Elements {
    pub fn nav_links(&self) -> &[Element] {
        &self.nav_links
    }

    /// Reveal elements of the given kinds, paired with their registry index.
    pub fn reveals_where(&self, include: impl Fn(RevealKind) -> bool) -> Vec<(usize, Element)> {
        self.reveals
            .iter()
            .zip(&self.reveal_kinds)
            .enumerate()
            .filter(|(_, (_, kind))| include(**kind))
            .map(|(index, (element, _))| (index, element.clone()))
            .collect()
    }
}

fn elements_in(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn first_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

fn anchor_target(link: &Element) -> Option<String> {
    let href = link.get_attribute("href")?;
    let id = href.strip_prefix('#')?;
    (!id.is_empty()).then(|| id.to_string())
}

fn timeline_marker(card: &Element) -> Option<Element> {
    let item = card.closest(".timeline-item").ok().flatten()?;
    first_in(&item, ".timeline-marker")
}

fn classify(element: &Element, marker: bool, items: usize) -> RevealKind {
    let classes = element.class_list();
    if classes.contains("project-card") {
        RevealKind::Card
    } else if classes.contains("experience-card") {
        RevealKind::Experience { marker }
    } else if classes.contains("package-category") {
        RevealKind::PackageCategory { items }
    } else {
        RevealKind::Plain
    }
}

/// Walks the rendered document once and builds the registry.
pub fn discover(document: &Document) -> (Registry, Elements) {
    let sections = elements_in(document.query_selector_all(SECTION_SELECTOR));
    let nav_links = elements_in(document.query_selector_all(NAV_LINK_SELECTOR));

    let mut reveals = Vec::new();
    let mut reveal_kinds = Vec::new();
    let mut markers = Vec::new();
    let mut package_items = Vec::new();

    for element in elements_in(document.query_selector_all(REVEAL_SELECTOR)) {
        let marker = timeline_marker(&element);
        let items = elements_in(element.query_selector_all(".package-item"));
        reveal_kinds.push(classify(&element, marker.is_some(), items.len()));
        markers.push(marker);
        package_items.push(items);
        reveals.push(element);
    }

    // Elements that are also reveal targets get a second entry, watched by
    // the scroll observer, so they pick up both classes.
    for element in elements_in(document.query_selector_all(SCROLL_REVEAL_SELECTOR)) {
        reveal_kinds.push(RevealKind::OnScroll);
        markers.push(None);
        package_items.push(Vec::new());
        reveals.push(element);
    }

    let skill_items = elements_in(document.query_selector_all(SKILL_ITEM_SELECTOR));
    let skill_bars: Vec<Option<Element>> = skill_items
        .iter()
        .map(|item| first_in(item, ".skill-progress"))
        .collect();
    let skill_levels: Vec<Option<Element>> = skill_items
        .iter()
        .map(|item| first_in(item, ".skill-level"))
        .collect();
    let skills = skill_items
        .iter()
        .zip(skill_bars.iter().zip(&skill_levels))
        .map(|(item, (bar, level_node))| SkillSeed {
            level: match (bar, level_node) {
                (Some(bar), Some(_)) => bar.get_attribute("data-level").as_deref().and_then(parse_level),
                _ => None,
            },
            animated: item.class_list().contains("animate"),
        })
        .collect();

    let query = |selector: &str| document.query_selector(selector).ok().flatten();

    let registry = Registry {
        sections: sections.iter().map(Element::id).collect(),
        nav_links: nav_links.iter().map(anchor_target).collect(),
        reveals: reveal_kinds.clone(),
        skills,
    };

    let elements = Elements {
        sections,
        nav_links,
        reveals,
        reveal_kinds,
        markers,
        package_items,
        skill_items,
        skill_bars,
        skill_levels,
        skills_section: query(".skills-section"),
        nav_menu: query(".nav-menu"),
        nav_toggle: query(".nav-toggle"),
        navbar: query(".navbar"),
        hero: query(".hero"),
    };

    (registry, elements)
}

/// The four observers the page needs, created once the runtime exists.
#[derive(Default)]
pub struct Observers {
    pub cards: Option<IntersectionObserver>,
    pub reveals: Option<IntersectionObserver>,
    pub on_scroll: Option<IntersectionObserver>,
    pub skills: Option<IntersectionObserver>,
}

/// [`Surface`] over the live document.
pub struct DomSurface {
    elements: Elements,
    observers: Observers,
    timers: HashMap<Task, i32>,
    deliver: Rc<dyn Fn(Task)>,
    logger: Logger,
}

impl DomSurface {
    pub fn new(elements: Elements, deliver: Rc<dyn Fn(Task)>, logger: Logger) -> Self {
        Self {
            elements,
            observers: Observers::default(),
            timers: HashMap::new(),
            deliver,
            logger,
        }
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn set_observers(&mut self, observers: Observers) {
        self.observers = observers;
    }

    /// Drops the bookkeeping for a timer that has just fired.
    pub fn timer_fired(&mut self, task: Task) {
        self.timers.remove(&task);
    }

    fn element(&self, node: Node) -> Option<&Element> {
        let elements = &self.elements;
        match node {
            Node::NavMenu => elements.nav_menu.as_ref(),
            Node::Navbar => elements.navbar.as_ref(),
            Node::Hero => elements.hero.as_ref(),
            Node::SkillsSection => elements.skills_section.as_ref(),
            Node::NavLink(index) => elements.nav_links.get(index),
            Node::Reveal(index) => elements.reveals.get(index),
            Node::Marker(index) => elements.markers.get(index)?.as_ref(),
            Node::PackageItem(category, item) => elements.package_items.get(category)?.get(item),
            Node::Skill(index) => elements.skill_items.get(index),
            Node::SkillBar(index) => elements.skill_bars.get(index)?.as_ref(),
        }
    }

    fn observer_for(&self, node: Node) -> Option<&IntersectionObserver> {
        match node {
            Node::SkillsSection => self.observers.skills.as_ref(),
            Node::Reveal(index) => match self.elements.reveal_kinds.get(index)? {
                RevealKind::Card => self.observers.cards.as_ref(),
                RevealKind::OnScroll => self.observers.on_scroll.as_ref(),
                _ => self.observers.reveals.as_ref(),
            },
            _ => None,
        }
    }
}

impl Surface for DomSurface {
    fn scroll_offset(&self) -> f64 {
        window()
            .and_then(|win| win.scroll_y().ok())
            .unwrap_or(0.0)
    }

    fn section_span(&self, index: usize) -> Option<Span> {
        let section = self.elements.sections.get(index)?.dyn_ref::<HtmlElement>()?;
        Some(Span::new(
            f64::from(section.offset_top()),
            f64::from(section.offset_height()),
        ))
    }

    fn skills_in_viewport(&self) -> bool {
        let Some(section) = self.elements.skills_section.as_ref() else {
            return false;
        };
        let viewport_height = window()
            .and_then(|win| win.inner_height().ok())
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);

        let rect = section.get_bounding_client_rect();
        rect.top() < viewport_height && rect.bottom() > 0.0
    }

    fn set_class(&mut self, node: Node, class: &str, on: bool) {
        if let Some(element) = self.element(node) {
            let _ = element.class_list().toggle_with_force(class, on);
        }
    }

    fn set_style(&mut self, node: Node, property: &str, value: &str) {
        if let Some(element) = self.element(node).and_then(|el| el.dyn_ref::<HtmlElement>()) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn ensure_skill_label(&mut self, skill: usize, text: &str) {
        let Some(level_node) = self.elements.skill_levels.get(skill).and_then(Option::as_ref) else {
            return;
        };
        if first_in(level_node, &format!(".{SKILL_LABEL_CLASS}")).is_some() {
            return;
        }
        let Some(document) = level_node.owner_document() else {
            return;
        };
        let Ok(label) = document.create_element("div") else {
            return;
        };

        label.set_class_name(SKILL_LABEL_CLASS);
        label.set_text_content(Some(text));
        let _ = level_node.insert_before(&label, level_node.first_child().as_ref());
    }

    fn unobserve(&mut self, node: Node) {
        if let (Some(observer), Some(element)) = (self.observer_for(node), self.element(node)) {
            observer.unobserve(element);
        }
    }

    fn scroll_into_view(&mut self, id: &str) -> bool {
        let Some(target) = window()
            .and_then(|win| win.document())
            .and_then(|document| document.get_element_by_id(id))
        else {
            return false;
        };

        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        target.scroll_into_view_with_scroll_into_view_options(&options);
        true
    }

    fn schedule(&mut self, task: Task, delay_ms: u32) {
        let Some(win) = window() else {
            return;
        };

        let deliver = self.deliver.clone();
        let callback = Closure::once_into_js(move || deliver(task));
        let timeout = i32::try_from(delay_ms).unwrap_or(i32::MAX);

        match win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout) {
            Ok(handle) => {
                self.timers.insert(task, handle);
            }
            Err(_) => self.logger.event(
                LogLevel::Warn,
                "timer_schedule_failed",
                serde_json::json!({ "task": format!("{task:?}") }),
            ),
        }
    }

    fn cancel(&mut self, task: Task) {
        let Some(handle) = self.timers.remove(&task) else {
            return;
        };
        if let Some(win) = window() {
            win.clear_timeout_with_handle(handle);
        }
    }

    fn trace(&mut self, event: &str, detail: &str) {
        self.logger
            .event(LogLevel::Debug, event, serde_json::json!({ "detail": detail }));
    }
}
