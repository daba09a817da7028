//! Mutation counters exported through the metrics facade.

/// Counts one successful mutation of `entity`.
pub(crate) fn record_mutation(entity: &'static str, operation: &'static str) {
    metrics::counter!(
        "entity_mutations_total",
        "entity" => entity,
        "operation" => operation
    )
    .increment(1);
}
