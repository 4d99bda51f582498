//! The plain row written by every backend.

use gw_sim::DwellEvent;

/// Which end of a dwell a row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellPhase {
    Start,
    End,
}

impl DwellPhase {
    /// Marker used in the console format: `[` on entry, `)` on exit.
    pub fn marker(self) -> char {
        match self {
            DwellPhase::Start => '[',
            DwellPhase::End => ')',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DwellPhase::Start => "start",
            DwellPhase::End => "end",
        }
    }
}

/// One dwell-start or dwell-end line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellRow {
    pub phase:    DwellPhase,
    /// Tenths since the simulation started.
    pub at:       u64,
    pub agent_id: u32,
    pub group_id: u32,
    pub x:        u32,
    pub y:        u32,
    /// Declared dwell in tenths.
    pub dwell:    u64,
}

impl DwellRow {
    pub fn from_event(phase: DwellPhase, ev: &DwellEvent) -> Self {
        Self {
            phase,
            at:       ev.at.0,
            agent_id: ev.agent.0,
            group_id: ev.group.0,
            x:        ev.pos.x,
            y:        ev.pos.y,
            dwell:    ev.dwell.0,
        }
    }
}
