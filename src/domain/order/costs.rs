// ============================================================================
// Cost Calculation
// ============================================================================
//
// Pure arithmetic over cost snapshots. Quantities and unit costs are always
// non-negative in valid data; everything is widened to i64 so a full order
// cannot overflow 32-bit math.
//
// ============================================================================

/// Cost of one line: quantity times the unit-cost snapshot, in cents.
pub fn line_total(quantity: i32, unit_cost: i64) -> i64 {
    i64::from(quantity) * unit_cost
}

/// Total cost of an order: the sum of its line totals.
pub fn order_total<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (i32, i64)>,
{
    lines
        .into_iter()
        .map(|(quantity, unit_cost)| line_total(quantity, unit_cost))
        .sum()
}

// ============================================================================
// Unit Tests
// ============================================================================
