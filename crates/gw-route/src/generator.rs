//! Seeded random populations, for stress runs and the `--random` CLI mode.
//!
//! Routes are lazy random walks: each step either stays put or moves to one
//! of the four neighbours, clamped to the grid.  Walks on a small grid with
//! few groups produce plenty of same-group contention, which is the point.

use gw_core::{AgentId, AgentRng, GwError, Position, SimRng, Tenths};

use crate::{AgentSpec, Route, RouteResult, Scenario, Step};

/// Shape of a generated population.
#[derive(Clone, Debug)]
pub struct GeneratorParams {
    pub grid_size: u32,
    pub agents:    u32,
    /// Groups are numbered `1..=groups`.
    pub groups:    u32,
    pub min_steps: u32,
    pub max_steps: u32,
    /// Dwells are drawn from `0..=max_dwell` tenths.
    pub max_dwell: u64,
    /// Probability of staying on the same cell for the next step.
    pub stay_prob: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            grid_size: 5,
            agents:    8,
            groups:    2,
            min_steps: 1,
            max_steps: 6,
            max_dwell: 5,
            stay_prob: 0.1,
        }
    }
}

/// Deterministic population generator.
pub struct RouteGenerator {
    params: GeneratorParams,
    seed:   u64,
}

impl RouteGenerator {
    pub fn new(params: GeneratorParams, seed: u64) -> RouteResult<Self> {
        let p = &params;
        if p.grid_size == 0 {
            return Err(GwError::NonPositiveGridSize(0).into());
        }
        if p.groups == 0 || p.min_steps == 0 || p.min_steps > p.max_steps {
            return Err(GwError::Config(format!(
                "invalid generator parameters: groups={} steps={}..={}",
                p.groups, p.min_steps, p.max_steps
            ))
            .into());
        }
        // Also rejects NaN.
        if !(0.0..=1.0).contains(&p.stay_prob) {
            return Err(GwError::Config(format!(
                "stay probability must lie in 0..=1, got {}",
                p.stay_prob
            ))
            .into());
        }
        Ok(Self { params, seed })
    }

    /// Agents get ids `1..=agents`; the same seed always yields the same
    /// scenario.
    pub fn generate(&self) -> Scenario {
        let p = &self.params;
        let mut shape = SimRng::new(self.seed);

        let agents = (1..=p.agents)
            .map(|id| {
                let group = shape.gen_range(1..=p.groups);
                let len = shape.gen_range(p.min_steps..=p.max_steps);
                let mut rng = AgentRng::new(self.seed, AgentId(id));
                AgentSpec::new(id, group, self.walk(&mut rng, len))
            })
            .collect();

        Scenario { grid_size: p.grid_size, agents }
    }

    fn walk(&self, rng: &mut AgentRng, len: u32) -> Route {
        let p = &self.params;
        let n = p.grid_size;
        let mut pos = Position::new(rng.gen_range(0..n), rng.gen_range(0..n));
        let first = Step { pos, dwell: Tenths(rng.gen_range(0..=p.max_dwell)) };

        let rest = (1..len)
            .map(|_| {
                if !rng.gen_bool(p.stay_prob) {
                    pos = neighbour(pos, rng.gen_range(0..4u8), n);
                }
                Step { pos, dwell: Tenths(rng.gen_range(0..=p.max_dwell)) }
            })
            .collect();

        Route::from_parts(first, rest)
    }
}

fn neighbour(pos: Position, dir: u8, n: u32) -> Position {
    let Position { x, y } = pos;
    match dir {
        0 => Position::new(x.saturating_sub(1), y),
        1 => Position::new((x + 1).min(n - 1), y),
        2 => Position::new(x, y.saturating_sub(1)),
        _ => Position::new(x, (y + 1).min(n - 1)),
    }
}
