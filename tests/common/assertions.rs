//! Domain-specific assertion macros for machinv harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* batch invariant was violated.

// ---------------------------------------------------------------------------
// Batch accounting
// ---------------------------------------------------------------------------

/// Assert that a `NormalizationResult` covers exactly `n` items: accepted and
/// rejected add up to `n`, and error indices are in range, unique, and in
/// input order.
///
/// ```rust
/// assert_accounted!(result, items.len());
/// ```
#[macro_export]
macro_rules! assert_accounted {
    ($result:expr, $n:expr) => {{
        let result: &machinv_core::NormalizationResult = &$result;
        let n: usize = $n;
        if result.accepted.len() + result.errors.len() != n {
            panic!(
                "assert_accounted! failed: {} accepted + {} rejected != {} items\n  errors: {:?}",
                result.accepted.len(),
                result.errors.len(),
                n,
                result.error_messages()
            );
        }
        let indices: Vec<usize> = result.errors.iter().map(|e| e.index).collect();
        if indices.windows(2).any(|w| w[0] >= w[1]) || indices.iter().any(|&i| i >= n) {
            panic!(
                "assert_accounted! failed: error indices {:?} are not unique, ordered, and < {}",
                indices, n
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Item errors
// ---------------------------------------------------------------------------

/// Assert that item `index` was rejected with a message containing `needle`.
///
/// ```rust
/// assert_item_error!(result, 1, "not a valid JSON object");
/// ```
#[macro_export]
macro_rules! assert_item_error {
    ($result:expr, $index:expr, $needle:expr) => {{
        let result: &machinv_core::NormalizationResult = &$result;
        let index: usize = $index;
        let needle: &str = $needle;
        match result.errors.iter().find(|e| e.index == index) {
            Some(err) if err.to_string().contains(needle) => {}
            Some(err) => panic!(
                "assert_item_error! failed: item {} error {:?} does not contain {:?}",
                index,
                err.to_string(),
                needle
            ),
            None => panic!(
                "assert_item_error! failed: item {} was not rejected.\n  errors: {:?}",
                index,
                result.error_messages()
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Canonical invariants
// ---------------------------------------------------------------------------

/// Assert that every accepted record satisfies the canonical invariants:
/// non-empty `os` and `cpu`, and a finite, non-negative `memory_gb` if any.
#[macro_export]
macro_rules! assert_canonical {
    ($result:expr) => {{
        let result: &machinv_core::NormalizationResult = &$result;
        for record in &result.accepted {
            if record.os.is_empty() || record.cpu.is_empty() {
                panic!("assert_canonical! failed: empty os or cpu in {:?}", record);
            }
            if let Some(gb) = record.memory_gb {
                if !gb.is_finite() || gb < 0.0 {
                    panic!("assert_canonical! failed: bad memory_gb in {:?}", record);
                }
            }
        }
    }};
}
