//! This module provides functionality for JIT compilation of formula trees.
//! It uses Cranelift as the backend compiler to generate native machine code.
//!
//! The main entry point is `build_function()`, which compiles a tree into a function
//! over a slice of variable values. Arithmetic is emitted inline; functions and powers
//! call the natives registered by [`crate::operators`].

use std::collections::HashMap;
use std::sync::Arc;

use cranelift::prelude::*;
use cranelift_codegen::Context;
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module};
use isa::TargetIsa;
use log::debug;

use crate::{
    errors::BuilderError,
    expr::{BinaryOp, Node},
    operators,
    types::JITFunction,
};

/// Builds a JIT-compiled function from a formula tree.
///
/// # Arguments
/// * `node` - The tree to compile
/// * `variables` - Variable names in input order; `input[i]` is the value of `variables[i]`
///
/// # Returns
/// A thread-safe function taking the variable values and returning the formula value.
/// Variables of the tree missing from `variables` evaluate to `0`, like in
/// [`Node::evaluate`]. An input shorter than `variables` yields `NaN`.
///
/// # Errors
/// Returns a BuilderError if compilation fails for any reason.
pub fn build_function(node: &Node, variables: &[String]) -> Result<JITFunction, BuilderError> {
    let isa = create_isa()?;
    let (mut module, mut ctx) = create_module_and_context(isa)?;
    let indices: HashMap<&str, usize> = variables
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    build_function_body(&mut ctx, node, &indices, &mut module)?;
    let raw_fn = compile_and_finalize(&mut module, &mut ctx)?;
    debug!("compiled {node} over {variables:?}");

    let arity = variables.len();
    Ok(Arc::new(move |input: &[f64]| {
        if input.len() < arity {
            return f64::NAN;
        }
        raw_fn(input.as_ptr())
    }))
}

/// Creates an Instruction Set Architecture (ISA) target for code generation.
///
/// Targets the host machine with non-PIC code, as the JIT module requires, optimised
/// for speed.
///
/// # Errors
/// Returns a BuilderError if:
/// - The host machine architecture is not supported
/// - Code generation configuration fails
pub(crate) fn create_isa() -> Result<Arc<dyn TargetIsa>, BuilderError> {
    let mut flag_builder = settings::builder();
    debug!("creating ISA for {}", target_lexicon::Triple::host());

    // cranelift-jit refuses position independent code on every architecture
    set_flag(&mut flag_builder, "use_colocated_libcalls", "false")?;
    set_flag(&mut flag_builder, "is_pic", "false")?;
    set_flag(&mut flag_builder, "opt_level", "speed")?;
    let verify = if cfg!(debug_assertions) { "true" } else { "false" };
    set_flag(&mut flag_builder, "enable_verifier", verify)?;

    let isa_builder = cranelift_native::builder()
        .map_err(|msg| BuilderError::HostMachineNotSupported(msg.to_string()))?;

    isa_builder
        .finish(settings::Flags::new(flag_builder))
        .map_err(BuilderError::CodegenError)
}

fn set_flag(builder: &mut settings::Builder, name: &str, value: &str) -> Result<(), BuilderError> {
    builder
        .set(name, value)
        .map_err(|e| BuilderError::HostMachineNotSupported(format!("{name}={value}: {e}")))
}

/// Creates a new JIT module and function context.
///
/// The module has every native math routine registered, and the context carries the
/// signature `fn(*const f64) -> f64`.
pub(crate) fn create_module_and_context(
    isa: Arc<dyn TargetIsa>,
) -> Result<(JITModule, Context), BuilderError> {
    let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
    operators::register_natives(&mut builder);

    let module = JITModule::new(builder);
    let mut ctx = module.make_context();

    let pointer = module.target_config().pointer_type();
    let mut sig = module.make_signature();
    sig.params.push(AbiParam::new(pointer));
    sig.returns.push(AbiParam::new(types::F64));
    ctx.func.signature = sig;

    Ok((module, ctx))
}

/// Lowers a tree into the function being built.
struct Lowering<'a, 'b> {
    builder: &'a mut FunctionBuilder<'b>,
    module: &'a mut JITModule,
    input: Value,
    indices: &'a HashMap<&'a str, usize>,
    linked: HashMap<&'static str, FuncId>,
}

impl Lowering<'_, '_> {
    fn native(&mut self, symbol: &'static str, arity: usize) -> Result<FuncId, BuilderError> {
        if let Some(id) = self.linked.get(symbol) {
            return Ok(*id);
        }
        let id = operators::link(&mut *self.module, symbol, arity)?;
        self.linked.insert(symbol, id);
        Ok(id)
    }

    fn lower(&mut self, node: &Node) -> Result<Value, BuilderError> {
        Ok(match node {
            Node::Number(value) => self.builder.ins().f64const(*value),
            Node::Constant(constant) => self.builder.ins().f64const(constant.value()),
            Node::Variable(name) => match self.indices.get(name.as_str()) {
                Some(index) => {
                    let offset = i32::try_from(*index * 8).map_err(|_| {
                        BuilderError::FunctionError(format!("too many variables for {name}"))
                    })?;
                    self.builder
                        .ins()
                        .load(types::F64, MemFlags::trusted(), self.input, offset)
                }
                None => self.builder.ins().f64const(0.0),
            },
            Node::Binary { op, left, right } => {
                let l = self.lower(left)?;
                let r = self.lower(right)?;
                match op {
                    BinaryOp::Plus => self.builder.ins().fadd(l, r),
                    BinaryOp::Minus => self.builder.ins().fsub(l, r),
                    BinaryOp::Times => self.builder.ins().fmul(l, r),
                    BinaryOp::Divide => self.builder.ins().fdiv(l, r),
                    BinaryOp::Power => {
                        let id = self.native(operators::POWF, 2)?;
                        operators::call(self.builder, &mut *self.module, id, &[l, r])
                    }
                }
            }
            Node::Function { function, argument } => {
                let u = self.lower(argument)?;
                let (symbol, _) = operators::native(*function);
                let id = self.native(symbol, 1)?;
                operators::call(self.builder, &mut *self.module, id, &[u])
            }
        })
    }
}

/// Builds the function body by generating Cranelift IR from the tree.
fn build_function_body(
    ctx: &mut Context,
    node: &Node,
    indices: &HashMap<&str, usize>,
    module: &mut JITModule,
) -> Result<(), BuilderError> {
    let mut builder_ctx = FunctionBuilderContext::new();
    let mut func_builder = FunctionBuilder::new(&mut ctx.func, &mut builder_ctx);

    let entry_block = func_builder.create_block();
    func_builder.append_block_params_for_function_params(entry_block);
    func_builder.switch_to_block(entry_block);
    func_builder.seal_block(entry_block);
    let input = func_builder.block_params(entry_block)[0];

    let mut lowering = Lowering {
        builder: &mut func_builder,
        module,
        input,
        indices,
        linked: HashMap::new(),
    };
    let result = lowering.lower(node)?;
    func_builder.ins().return_(&[result]);
    func_builder.finalize();

    Ok(())
}

/// Compiles and finalizes the function, returning a callable function pointer.
///
/// # Errors
/// Returns a BuilderError if:
/// - Function declaration fails
/// - Function definition fails
/// - Module finalization fails
fn compile_and_finalize(
    module: &mut JITModule,
    ctx: &mut Context,
) -> Result<extern "C" fn(*const f64) -> f64, BuilderError> {
    let func_id = module
        .declare_function("formula", Linkage::Local, &ctx.func.signature)
        .map_err(|msg| BuilderError::DeclarationError(msg.to_string()))?;

    module
        .define_function(func_id, ctx)
        .map_err(|msg| BuilderError::FunctionError(msg.to_string()))?;

    module.clear_context(ctx);
    module.finalize_definitions()?;

    // SAFETY: the function was compiled with the host calling convention and signature
    // `fn(*const f64) -> f64`. Dropping a JITModule does not free its code, so the
    // pointer stays valid for the rest of the process.
    let func = unsafe {
        std::mem::transmute::<*const u8, extern "C" fn(*const f64) -> f64>(
            module.get_finalized_function(func_id),
        )
    };
    Ok(func)
}
