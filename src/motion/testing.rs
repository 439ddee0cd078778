//! In-memory [`Surface`] with a virtual clock.

use super::{Node, Span, Surface, Synchronizer, Task};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    Class(String, bool),
    Style(String, String),
}

struct Timer {
    due: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
pub struct FakeSurface {
    offset: f64,
    sections: Vec<(String, Option<Span>)>,
    skills_visible: bool,
    classes: BTreeMap<Node, BTreeSet<String>>,
    styles: BTreeMap<(Node, String), String>,
    writes: Vec<(Node, Write)>,
    labels: BTreeMap<usize, Vec<String>>,
    unobserved: BTreeSet<Node>,
    cancelled: Vec<Task>,
    scrolled_to: Vec<String>,
    timers: Vec<Timer>,
    now: u64,
    seq: u64,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sections(mut self, sections: Vec<(&str, Span)>) -> Self {
        self.sections = sections
            .into_iter()
            .map(|(id, span)| (id.to_string(), Some(span)))
            .collect();
        self
    }

    /// Makes the section at `index` unmeasurable, as if it left the document.
    pub fn drop_section(&mut self, index: usize) {
        if let Some(section) = self.sections.get_mut(index) {
            section.1 = None;
        }
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn set_skills_in_viewport(&mut self, visible: bool) {
        self.skills_visible = visible;
    }

    /// Moves the clock forward, firing due timers in due-then-scheduling order.
    /// Timers scheduled while advancing fire too if they fall inside the window.
    pub fn advance(&mut self, ms: u64, sync: &mut Synchronizer) {
        let target = self.now + ms;

        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due <= target)
                .min_by_key(|(_, timer)| (timer.due, timer.seq))
                .map(|(position, _)| position);
            let Some(position) = next else {
                break;
            };

            let timer = self.timers.remove(position);
            self.now = timer.due;
            sync.on_timer(timer.task, self);
        }

        self.now = target;
    }

    pub fn has_class(&self, node: Node, class: &str) -> bool {
        self.classes
            .get(&node)
            .is_some_and(|classes| classes.contains(class))
    }

    pub fn style(&self, node: Node, property: &str) -> Option<&str> {
        self.styles
            .get(&(node, property.to_string()))
            .map(String::as_str)
    }

    pub fn writes_to(&self, node: Node) -> Vec<Write> {
        self.writes
            .iter()
            .filter(|(target, _)| *target == node)
            .map(|(_, write)| write.clone())
            .collect()
    }

    pub fn class_adds(&self, node: Node, class: &str) -> usize {
        self.writes_to(node)
            .iter()
            .filter(|write| **write == Write::Class(class.to_string(), true))
            .count()
    }

    pub fn width_resets(&self, skill: usize) -> usize {
        self.writes_to(Node::SkillBar(skill))
            .iter()
            .filter(|write| **write == Write::Style("width".to_string(), "0%".to_string()))
            .count()
    }

    pub fn labels(&self, skill: usize) -> Vec<String> {
        self.labels.get(&skill).cloned().unwrap_or_default()
    }

    pub fn unobserved(&self, node: Node) -> bool {
        self.unobserved.contains(&node)
    }

    pub fn cancelled(&self, task: Task) -> bool {
        self.cancelled.contains(&task)
    }

    pub fn scrolled_to(&self) -> &[String] {
        &self.scrolled_to
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Surface for FakeSurface {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn section_span(&self, index: usize) -> Option<Span> {
        self.sections.get(index).and_then(|(_, span)| *span)
    }

    fn skills_in_viewport(&self) -> bool {
        self.skills_visible
    }

    fn set_class(&mut self, node: Node, class: &str, on: bool) {
        let classes = self.classes.entry(node).or_default();
        if on {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
        self.writes.push((node, Write::Class(class.to_string(), on)));
    }

    fn set_style(&mut self, node: Node, property: &str, value: &str) {
        self.styles
            .insert((node, property.to_string()), value.to_string());
        self.writes
            .push((node, Write::Style(property.to_string(), value.to_string())));
    }

    fn ensure_skill_label(&mut self, skill: usize, text: &str) {
        let labels = self.labels.entry(skill).or_default();
        if labels.is_empty() {
            labels.push(text.to_string());
        }
    }

    fn unobserve(&mut self, node: Node) {
        self.unobserved.insert(node);
    }

    fn scroll_into_view(&mut self, id: &str) -> bool {
        let found = self.sections.iter().any(|(section, _)| section == id);
        if found {
            self.scrolled_to.push(id.to_string());
        }
        found
    }

    fn schedule(&mut self, task: Task, delay_ms: u32) {
        self.seq += 1;
        self.timers.push(Timer {
            due: self.now + u64::from(delay_ms),
            seq: self.seq,
            task,
        });
    }

    fn cancel(&mut self, task: Task) {
        self.timers.retain(|timer| timer.task != task);
        self.cancelled.push(task);
    }
}
