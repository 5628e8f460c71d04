use std::collections::HashMap;
use std::sync::Arc;

/// Variable values used by [`crate::expr::Node::evaluate`], keyed by variable name.
pub type Bindings = HashMap<String, f64>;

/// Type alias for a JIT-compiled formula.
///
/// This represents a function that:
/// - Takes a slice of input values, one per formula variable in first-seen order
/// - Returns the value of the formula at that point
/// - Is both Send and Sync so samples can be computed from several threads
pub type JITFunction = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// One sampled point `(x, y)`.
pub type Sample = (f64, f64);
