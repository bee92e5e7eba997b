//! Time arbitration model.
//!
//! Derived clock domains that carry a `dt_req` attachment each request a
//! time step per master-clock cycle. The time manager reduces the requests
//! to one global `emu_dt` and accumulates `emu_time`. Gated domains feed a
//! separate clock gating network. Both vectors are sized and indexed in
//! declaration order; a model with no requests selects the fixed-step path.

use crate::path::HierPath;
use crate::structure::StructureConfig;
use tracing::debug;

/// One time-step request, at index `index` of the `dt_req` vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtRequest<'a> {
    /// Position in the request vector.
    pub index: usize,
    /// Requesting domain.
    pub domain: &'a str,
    /// Path the request is read from.
    pub source: &'a HierPath,
}

/// One gate-enable request, at index `index` of `clk_vals` / `clks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest<'a> {
    /// Position in the gating vectors.
    pub index: usize,
    /// Gated domain.
    pub domain: &'a str,
    /// Name of the gated clock signal declared in the generated module.
    pub gated_clock: String,
    /// Path the gate enable is read from.
    pub request: &'a HierPath,
    /// Path the gated clock drives.
    pub gated: &'a HierPath,
}

/// How simultaneous time-step requests reduce to one global step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReductionRule {
    /// Arithmetic minimum; ties go to the lowest declaration index.
    #[default]
    Minimum,
}

impl ReductionRule {
    /// Reference model of the rule over encoded requests. Returns the index
    /// and value of the selected request, or `None` for no requests.
    pub fn select(self, requests: &[i64]) -> Option<(usize, i64)> {
        match self {
            ReductionRule::Minimum => requests
                .iter()
                .copied()
                .enumerate()
                .min_by_key(|&(index, value)| (value, index)),
        }
    }

    /// One-line description rendered next to the time manager.
    pub fn describe(self) -> &'static str {
        match self {
            ReductionRule::Minimum => {
                "emu_dt = min(dt_req); ties resolve to the lowest declaration index"
            }
        }
    }
}

/// Arbitration state derived from a [`StructureConfig`]. Not stored; built
/// on demand and borrowed from the structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeArbitration<'a> {
    dt_requests: Vec<DtRequest<'a>>,
    gate_requests: Vec<GateRequest<'a>>,
    rule: ReductionRule,
}

impl<'a> TimeArbitration<'a> {
    /// Scans the derived clocks in declaration order.
    pub fn from_structure(config: &'a StructureConfig) -> Self {
        let mut dt_requests = Vec::new();
        let mut gate_requests = Vec::new();
        for clock in config.clk_derived() {
            let Some(derived) = clock.as_derived() else {
                continue;
            };
            if let Some(source) = &derived.dt_req {
                dt_requests.push(DtRequest {
                    index: dt_requests.len(),
                    domain: clock.name(),
                    source,
                });
            }
            if let Some(gating) = &derived.gating {
                gate_requests.push(GateRequest {
                    index: gate_requests.len(),
                    domain: clock.name(),
                    gated_clock: format!("{}_gated", clock.name()),
                    request: &gating.request,
                    gated: &gating.gated,
                });
            }
        }
        debug!(
            n_dt = dt_requests.len(),
            n_clks = gate_requests.len(),
            "arbitration sized"
        );
        Self {
            dt_requests,
            gate_requests,
            rule: ReductionRule::default(),
        }
    }

    /// Number of domains requesting an explicit time step.
    pub fn n_dt(&self) -> usize {
        self.dt_requests.len()
    }

    /// Number of gated domains.
    pub fn n_clks(&self) -> usize {
        self.gate_requests.len()
    }

    /// `true` when no domain requests a step; time then advances by the
    /// fixed configured increment and no time manager is instantiated.
    pub fn is_single_rate(&self) -> bool {
        self.dt_requests.is_empty()
    }

    /// `true` when a clock gating network is needed.
    pub fn has_gating(&self) -> bool {
        !self.gate_requests.is_empty()
    }

    /// Time-step requests in vector order.
    pub fn dt_requests(&self) -> &[DtRequest<'a>] {
        &self.dt_requests
    }

    /// Gate requests in vector order.
    pub fn gate_requests(&self) -> &[GateRequest<'a>] {
        &self.gate_requests
    }

    /// The reduction rule documented for the time manager.
    pub fn rule(&self) -> ReductionRule {
        self.rule
    }
}
