use super::errors::OrderError;
use super::value_objects::OrderStatus;

// ============================================================================
// Status Transition Engine
// ============================================================================
//
// The order lifecycle state machine:
//
//     pending ----> in_progress ----> delivered
//        \               \
//         \               +---------> cancelled
//          +------------------------> cancelled
//
// A pure decision function over two enum values. Any pair not listed above
// is rejected, including transitions to the same state and any move out of
// a terminal state. Persistence is the caller's concern.
//
// ============================================================================

/// Decide whether an order may move from `from` to `to`. Returns the new
/// status on success so callers persist exactly what was decided.
pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, OrderError> {
    use OrderStatus::*;

    // Terminal states have no exits at all.
    if from.is_terminal() {
        return Err(OrderError::InvalidTransition { from, to });
    }

    match (from, to) {
        (Pending, InProgress)
        | (Pending, Cancelled)
        | (InProgress, Delivered)
        | (InProgress, Cancelled) => Ok(to),
        _ => Err(OrderError::InvalidTransition { from, to }),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
