//! Requirements coverage derived from the requirement index.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::action::Action;
use crate::index::Indices;
use crate::phase::sort_phases;

/// How far one requirement has travelled through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementCoverage {
    pub id: String,
    /// Non-empty phases that referenced the requirement, canonical order.
    pub phases: Vec<String>,
    pub agents: BTreeSet<String>,
    pub trace_count: usize,
    /// Action of the trace with the highest `log_seq`.
    pub latest_action: Option<Action>,
}

/// One row per expanded requirement id, sorted by id.
pub fn requirement_coverage(indices: &Indices) -> Vec<RequirementCoverage> {
    indices
        .requirements()
        .iter()
        .map(|(id, traces)| {
            let mut phases: Vec<String> = traces
                .iter()
                .filter(|t| !t.phase.is_empty())
                .map(|t| t.phase.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            sort_phases(&mut phases);

            RequirementCoverage {
                id: id.clone(),
                phases,
                agents: traces.iter().map(|t| t.event.agent.clone()).collect(),
                trace_count: traces.len(),
                latest_action: traces
                    .iter()
                    .max_by_key(|t| t.event.log_seq)
                    .map(|t| t.action.clone()),
            }
        })
        .collect()
}
