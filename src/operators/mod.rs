//! Functions for linking and calling native math routines in JIT-compiled code.
//!
//! This module provides functionality to:
//! - Register the native entry points with the JIT so imports resolve
//! - Declare an imported routine with an `(f64, ..) -> f64` signature
//! - Generate Cranelift IR instructions to call a declared routine
//!
//! The natives themselves live in [`natives`]; every [`crate::functions::Function`] and
//! the power operator has one.

use cranelift::prelude::FunctionBuilder;
use cranelift_codegen::ir::types::F64;
use cranelift_codegen::ir::{AbiParam, InstBuilder, Value};
use cranelift_jit::JITBuilder;
use cranelift_module::{FuncId, Linkage, Module};

use crate::errors::BuilderError;
use crate::functions::Function;

pub(crate) mod natives;

pub(crate) use natives::{native, POWF};

/// Makes every native resolvable by name inside JIT-compiled code.
pub(crate) fn register_natives(builder: &mut JITBuilder) {
    for function in Function::ALL {
        let (symbol, address) = native(function);
        builder.symbol(symbol, address);
    }
    builder.symbol(POWF, natives::powf_address());
}

/// Declares an imported routine taking `arity` doubles and returning one.
///
/// # Arguments
/// * `module` - The Cranelift module to declare the function in
/// * `symbol` - Name the routine was registered under
/// * `arity` - Number of `f64` parameters
pub(crate) fn link(
    module: &mut dyn Module,
    symbol: &str,
    arity: usize,
) -> Result<FuncId, BuilderError> {
    let mut sig = module.make_signature();
    for _ in 0..arity {
        sig.params.push(AbiParam::new(F64));
    }
    sig.returns.push(AbiParam::new(F64));

    module
        .declare_function(symbol, Linkage::Import, &sig)
        .map_err(|e| BuilderError::DeclarationError(format!("{symbol}: {e}")))
}

/// Generates Cranelift IR instructions to call a previously linked routine.
///
/// # Returns
/// The Cranelift IR value containing the result of the call
pub(crate) fn call(
    builder: &mut FunctionBuilder,
    module: &mut dyn Module,
    func_id: FuncId,
    args: &[Value],
) -> Value {
    let func = module.declare_func_in_func(func_id, builder.func);
    let call = builder.ins().call(func, args);
    builder.inst_results(call)[0]
}
