//! Input loaders.
//!
//! # Text format
//!
//! Whitespace-separated integers, line breaks insignificant:
//!
//! ```text
//! N AGENT_COUNT
//! id group step_count  x y dwell  x y dwell ...
//! ...                                  (AGENT_COUNT agent blocks)
//! ```
//!
//! `dwell` is in tenths of a time unit.  Trailing tokens after the last
//! agent block are ignored.
//!
//! # CSV format
//!
//! One row per step; the grid size comes from configuration.  Rows may appear
//! in any order, `step` orders them within an agent and agents keep the order
//! of their first row.
//!
//! ```csv
//! agent_id,group_id,step,x,y,dwell_tenths
//! 1,1,0,0,0,0
//! 1,1,1,1,1,5
//! 2,1,0,1,1,0
//! 2,1,1,0,0,5
//! ```
//!
//! Both loaders validate the result, so a returned scenario is ready to run.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use gw_core::{AgentId, GwError};

use crate::{AgentSpec, Route, RouteError, RouteResult, Scenario, Step, validate_agents};

// ── Text format ───────────────────────────────────────────────────────────────

/// Load a scenario in the classic text format from `path`.
pub fn load_scenario(path: &Path) -> RouteResult<Scenario> {
    let file = std::fs::File::open(path)?;
    load_scenario_reader(file)
}

/// Like [`load_scenario`] but reads any `Read` source (stdin, `Cursor`, …).
pub fn load_scenario_reader<R: Read>(mut reader: R) -> RouteResult<Scenario> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = Tokens::new(&text);

    let grid = tokens.next_int("grid size")?;
    if grid <= 0 {
        return Err(GwError::NonPositiveGridSize(grid).into());
    }
    let grid_size = to_u32(grid, "grid size")?;
    let agent_count = tokens.next_count("agent count")?;

    // Counts are untrusted: grow as tokens arrive instead of preallocating.
    let mut agents = Vec::new();
    for _ in 0..agent_count {
        let id = tokens.next_u32("agent id")?;
        let group = tokens.next_u32("group id")?;
        let step_count = tokens.next_count("step count")?;

        let mut steps = Vec::new();
        for _ in 0..step_count {
            let x = tokens.next_u32("x")?;
            let y = tokens.next_u32("y")?;
            let dwell = tokens.next_u32("dwell")?;
            steps.push(Step::new(x, y, dwell as u64));
        }
        let route = Route::new(steps).ok_or(RouteError::EmptyRoute { agent: AgentId(id) })?;
        agents.push(AgentSpec::new(id, group, route));
    }

    let scenario = Scenario { grid_size, agents };
    scenario.validate()?;
    Ok(scenario)
}

/// Cursor over whitespace-separated integer tokens.
struct Tokens<'a> {
    inner:    std::str::SplitWhitespace<'a>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { inner: text.split_whitespace(), consumed: 0 }
    }

    fn next_int(&mut self, what: &str) -> RouteResult<i64> {
        let token = self.inner.next().ok_or_else(|| {
            RouteError::Parse(format!("unexpected end of input: expected {what}"))
        })?;
        self.consumed += 1;
        token.parse::<i64>().map_err(|_| {
            RouteError::Parse(format!(
                "token {} ({token:?}): expected integer {what}",
                self.consumed
            ))
        })
    }

    fn next_u32(&mut self, what: &str) -> RouteResult<u32> {
        let v = self.next_int(what)?;
        to_u32(v, what)
    }

    fn next_count(&mut self, what: &str) -> RouteResult<usize> {
        self.next_u32(what).map(|v| v as usize)
    }
}

fn to_u32(v: i64, what: &str) -> RouteResult<u32> {
    u32::try_from(v)
        .map_err(|_| RouteError::Parse(format!("{what} {v} is out of range (0..=4294967295)")))
}

// ── CSV format ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StepRecord {
    agent_id:     u32,
    group_id:     u32,
    step:         u32,
    x:            u32,
    y:            u32,
    dwell_tenths: u64,
}

/// Load agents from a per-step CSV file and validate them on a
/// `grid_size`² grid.
pub fn load_agents_csv(path: &Path, grid_size: u32) -> RouteResult<Scenario> {
    let file = std::fs::File::open(path)?;
    load_agents_csv_reader(file, grid_size)
}

/// Like [`load_agents_csv`] but accepts any `Read` source.
pub fn load_agents_csv_reader<R: Read>(reader: R, grid_size: u32) -> RouteResult<Scenario> {
    if grid_size == 0 {
        return Err(GwError::NonPositiveGridSize(0).into());
    }

    // ── Parse and bucket rows by agent ────────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut order: Vec<u32> = Vec::new();
    let mut by_agent: FxHashMap<u32, (u32, Vec<StepRecord>)> = FxHashMap::default();

    for result in csv_reader.deserialize::<StepRecord>() {
        let row = result.map_err(|e| RouteError::Parse(e.to_string()))?;
        let entry = by_agent.entry(row.agent_id).or_insert_with(|| {
            order.push(row.agent_id);
            (row.group_id, Vec::new())
        });
        if entry.0 != row.group_id {
            return Err(RouteError::Parse(format!(
                "agent {} listed with groups {} and {}",
                row.agent_id, entry.0, row.group_id
            )));
        }
        entry.1.push(row);
    }

    // ── Build one AgentSpec per agent, in first-seen order ────────────────
    let mut agents = Vec::with_capacity(order.len());
    for id in order {
        let Some((group, mut rows)) = by_agent.remove(&id) else {
            continue;
        };
        rows.sort_by_key(|r| r.step);
        if let Some(w) = rows.windows(2).find(|w| w[0].step == w[1].step) {
            return Err(RouteError::Parse(format!(
                "agent {id} lists step {} twice",
                w[0].step
            )));
        }
        let steps = rows
            .iter()
            .map(|r| Step::new(r.x, r.y, r.dwell_tenths))
            .collect();
        let route = Route::new(steps).ok_or(RouteError::EmptyRoute { agent: AgentId(id) })?;
        agents.push(AgentSpec::new(id, group, route));
    }

    validate_agents(&agents, grid_size)?;
    Ok(Scenario { grid_size, agents })
}
