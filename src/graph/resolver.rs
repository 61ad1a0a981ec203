use super::definition::{Graph, Step, StepKind, Transition};

impl Graph {
    /// Returns the first entry step in stored order.
    pub fn find_entry(&self) -> Option<&Step> {
        self.entries().next()
    }

    /// All entry steps in stored order.
    pub fn entries(&self) -> impl Iterator<Item = &Step> {
        self.steps()
            .iter()
            .filter(|step| matches!(step.kind, StepKind::Entry))
    }

    /// All transitions leaving `step_id`, in stored order.
    pub fn outgoing(&self, step_id: &str) -> Vec<&Transition> {
        self.outgoing_positions(step_id)
            .iter()
            .filter_map(|&position| self.transition_at(position))
            .collect()
    }

    /// Looks up a step by id. `None` for ids that no step carries.
    pub fn resolve(&self, step_id: &str) -> Option<&Step> {
        self.step_position(step_id)
            .and_then(|position| self.step_at(position))
    }

    /// Resolves the target of a transition, dropping dangling ones.
    pub fn target_of(&self, transition: &Transition) -> Option<&Step> {
        self.resolve(&transition.target)
    }
}
