//! Steps and routes.

use gw_core::{Position, Tenths};

/// One itinerary entry: go to `pos`, stay for `dwell`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub pos:   Position,
    pub dwell: Tenths,
}

impl Step {
    pub fn new(x: u32, y: u32, dwell_tenths: u64) -> Self {
        Self { pos: Position::new(x, y), dwell: Tenths(dwell_tenths) }
    }
}

/// A non-empty, read-only sequence of steps.
///
/// The only constructor rejects an empty list, so runners may assume
/// `first()` exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    steps: Box<[Step]>,
}

impl Route {
    /// `None` if `steps` is empty.
    pub fn new(steps: Vec<Step>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self { steps: steps.into_boxed_slice() })
    }

    /// Infallible constructor: `first` followed by `rest`.
    pub fn from_parts(first: Step, rest: Vec<Step>) -> Self {
        let mut steps = Vec::with_capacity(rest.len() + 1);
        steps.push(first);
        steps.extend(rest);
        Self { steps: steps.into_boxed_slice() }
    }

    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> Step {
        self.steps[0]
    }

    pub fn last(&self) -> Step {
        self.steps[self.steps.len() - 1]
    }

    /// Sum of all dwells, a lower bound on the run time of the agent.
    pub fn total_dwell(&self) -> Tenths {
        Tenths(self.steps.iter().map(|s| s.dwell.0).sum())
    }

    /// First step (if any) that leaves a `size`×`size` grid.
    pub fn first_out_of_bounds(&self, size: u32) -> Option<(usize, Step)> {
        self.steps
            .iter()
            .copied()
            .enumerate()
            .find(|(_, s)| !s.pos.within(size))
    }
}
