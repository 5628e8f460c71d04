//! `extern "C"` entry points called from JIT-compiled formulas.
//!
//! Each one defers to the numeric rule of [`Function::apply`] so compiled and
//! interpreted evaluation agree bit for bit.

use crate::expr::BinaryOp;
use crate::functions::Function;

/// Symbol the power operator is registered under.
pub(crate) const POWF: &str = "graphly_powf";

extern "C" fn graphly_powf(base: f64, exponent: f64) -> f64 {
    BinaryOp::Power.apply(base, exponent)
}

pub(crate) fn powf_address() -> *const u8 {
    graphly_powf as *const u8
}

macro_rules! natives {
    ($($function:ident => $symbol:ident),* $(,)?) => {
        $(
            extern "C" fn $symbol(u: f64) -> f64 {
                Function::$function.apply(u)
            }
        )*

        /// Symbol name and address of the native behind `function`.
        pub(crate) fn native(function: Function) -> (&'static str, *const u8) {
            match function {
                $(Function::$function => (stringify!($symbol), $symbol as *const u8),)*
            }
        }
    };
}

natives! {
    Sqrt => graphly_sqrt,
    Ln => graphly_ln,
    Log => graphly_log,
    Sin => graphly_sin,
    Sinh => graphly_sinh,
    ArcSin => graphly_asin,
    ArcSinh => graphly_asinh,
    Cos => graphly_cos,
    Cosh => graphly_cosh,
    ArcCos => graphly_acos,
    ArcCosh => graphly_acosh,
    Tan => graphly_tan,
    Tanh => graphly_tanh,
    ArcTan => graphly_atan,
    ArcTanh => graphly_atanh,
    Cot => graphly_cot,
    Coth => graphly_coth,
    ArcCot => graphly_acot,
}
