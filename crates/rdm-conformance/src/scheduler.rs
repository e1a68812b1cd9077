use crate::error::{ConformanceError, Result};
use crate::resolver::{DependencyGraph, InstanceId};
use std::collections::{BTreeSet, VecDeque};
use tracing::error;

/// Orders the graph so every test runs after all of its dependencies.
///
/// Ready tests are taken first-in first-out, and tests that become ready at
/// the same time are queued in registration order, so the same graph always
/// yields the same order.
pub fn schedule(graph: &DependencyGraph) -> Result<Vec<InstanceId>> {
    let mut ids: Vec<InstanceId> = graph.ids().collect();
    ids.sort_by_key(|id| graph.instance(*id).registration_index());
    let deps = graph.ids().map(|id| graph.dependencies(id).clone()).collect();

    kahn(&ids, deps).map_err(|remaining| {
        let remaining: Vec<String> = remaining
            .into_iter()
            .map(|id| graph.instance(id).name().to_string())
            .collect();
        error!("Unable to schedule tests {}", remaining.join(", "));
        ConformanceError::ScheduleStalled { remaining }
    })
}

/// `ids` must be in registration order; `deps` is indexed by instance id.
/// On failure returns the instances that never became ready.
fn kahn(
    ids: &[InstanceId],
    mut deps: Vec<BTreeSet<InstanceId>>,
) -> std::result::Result<Vec<InstanceId>, Vec<InstanceId>> {
    let (mut remaining, ready): (Vec<InstanceId>, Vec<InstanceId>) = ids
        .iter()
        .copied()
        .partition(|id| !deps[id.index()].is_empty());
    let mut ready: VecDeque<InstanceId> = ready.into();
    let mut order = Vec::with_capacity(ids.len());

    while let Some(current) = ready.pop_front() {
        order.push(current);
        remaining.retain(|id| {
            let pending = &mut deps[id.index()];
            pending.remove(&current);
            if pending.is_empty() {
                ready.push_back(*id);
                false
            } else {
                true
            }
        });
    }

    if remaining.is_empty() {
        Ok(order)
    } else {
        Err(remaining)
    }
}
