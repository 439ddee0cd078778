use super::{stagger, Node, Surface, Synchronizer, Task};

const ANIMATED_CLASS: &str = "animate";

/// A skill item as found in the document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillSeed {
    /// Target level in percent. `None` when the item lacks a progress bar,
    /// a level node or a readable `data-level`.
    pub level: Option<f64>,
    /// Already carries the animated marker.
    pub animated: bool,
}

/// Reads a `data-level` value. Fractions are kept, levels above 100 are
/// capped, negative and non-finite values are rejected.
pub fn parse_level(raw: &str) -> Option<f64> {
    let value = raw.trim().trim_end_matches('%').trim_end();
    let level = value.parse::<f64>().ok()?;
    if !level.is_finite() || level < 0.0 {
        return None;
    }
    Some(level.min(100.0) + 0.0)
}

/// Lifecycle of one skill bar. Only `Pending` reacts to a trigger, so any
/// number of overlapping passes lands every item in the same final state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SkillPhase {
    Inert,
    Pending,
    Queued,
    Labeled,
    Animated,
}

impl SkillPhase {
    pub(super) fn from_seed(seed: &SkillSeed) -> Self {
        match (seed.level, seed.animated) {
            (None, _) => Self::Inert,
            (Some(_), true) => Self::Animated,
            (Some(_), false) => Self::Pending,
        }
    }
}

impl Synchronizer {
    /// The skills section entered (or left) the viewport.
    pub fn on_skills_intersect(&mut self, intersecting: bool, surface: &mut impl Surface) {
        if intersecting {
            self.run_skill_pass("intersection", surface);
        }
    }

    pub fn skill_animated(&self, index: usize) -> bool {
        self.skill_phases.get(index) == Some(&SkillPhase::Animated)
    }

    pub(super) fn skills_pending(&self) -> bool {
        self.skill_phases.contains(&SkillPhase::Pending)
    }

    pub(super) fn any_skill_animated(&self) -> bool {
        self.skill_phases.contains(&SkillPhase::Animated)
    }

    pub(super) fn run_skill_pass(&mut self, trigger: &str, surface: &mut impl Surface) {
        let pending: Vec<usize> = self
            .skill_phases
            .iter()
            .enumerate()
            .filter(|(_, phase)| **phase == SkillPhase::Pending)
            .map(|(index, _)| index)
            .collect();

        surface.trace(
            "skill_pass",
            &format!("trigger={trigger} items={} pending={}", self.skill_phases.len(), pending.len()),
        );

        for index in pending {
            self.skill_phases[index] = SkillPhase::Queued;
            let delay = stagger(index, self.config.skill_stagger_ms);
            self.after(Task::SkillStep(index), delay, surface);
        }
    }

    pub(super) fn skill_step(&mut self, index: usize, surface: &mut impl Surface) {
        if self.skill_phases.get(index) != Some(&SkillPhase::Queued) {
            return;
        }
        let Some(level) = self.registry.skills[index].level else {
            return;
        };

        surface.ensure_skill_label(index, &format!("{level}%"));
        surface.set_style(Node::SkillBar(index), "width", "0%");
        self.skill_phases[index] = SkillPhase::Labeled;
        self.after(Task::SkillFill(index), self.config.skill_fill_delay_ms, surface);
    }

    pub(super) fn skill_fill(&mut self, index: usize, surface: &mut impl Surface) {
        if self.skill_phases.get(index) != Some(&SkillPhase::Labeled) {
            return;
        }
        let Some(level) = self.registry.skills[index].level else {
            return;
        };

        surface.set_style(Node::SkillBar(index), "width", &format!("{level}%"));
        surface.set_class(Node::Skill(index), ANIMATED_CLASS, true);
        self.skill_phases[index] = SkillPhase::Animated;

        if self.skills_settled() {
            surface.trace("skill_pass_complete", &format!("items={}", self.skill_phases.len()));
            surface.cancel(Task::SkillViewportCheck);
            surface.cancel(Task::SkillFallback);
            surface.cancel(Task::SkillLoadCheck);
            surface.unobserve(Node::SkillsSection);
        }
    }

    fn skills_settled(&self) -> bool {
        self.skill_phases
            .iter()
            .all(|phase| matches!(phase, SkillPhase::Inert | SkillPhase::Animated))
    }
}
