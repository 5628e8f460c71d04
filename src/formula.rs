//! High-level handling of a typed formula.
//!
//! A [`Formula`] keeps the text a user typed together with its parsed tree and the
//! variables it uses. It validates the number of distinct variables for the input slot it
//! came from, renders itself for display and compiles to a [`CompiledFormula`] for fast
//! sampling.

use colored::Colorize;
use log::debug;
use rayon::prelude::*;

use crate::backends::vector::Vector;
use crate::builder::build_function;
use crate::errors::FormulaError;
use crate::expr::Node;
use crate::parser::parse_str;
use crate::sampling::{calc_values, important_ys, SamplingConfig};
use crate::simplify::{simplify, Simplifier};
use crate::types::{Bindings, JITFunction, Sample};

/// The kind of input slot a formula was typed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// `y = f(x)`, one variable
    Explicit,
    /// `F(x, y) = 0`, up to two variables
    Implicit,
}

impl InputKind {
    /// How many distinct variables a formula of this kind may use.
    pub fn allowed_variables(self) -> usize {
        match self {
            InputKind::Explicit => 1,
            InputKind::Implicit => 2,
        }
    }

    /// Display form around the rendered formula.
    pub fn fancy(self, tex: &str) -> String {
        match self {
            InputKind::Explicit => format!("y = {tex}"),
            InputKind::Implicit => format!("{tex} = 0"),
        }
    }
}

/// A parsed formula together with the text it came from.
#[derive(Clone)]
pub struct Formula {
    source: String,
    node: Node,
    variables: Vec<String>,
    kind: Option<InputKind>,
}

impl std::fmt::Debug for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}: {}", "Source".cyan(), self.source)?;
        writeln!(f, "    {}: {}", "Canonical".cyan(), self.canonical())?;
        writeln!(f, "    {}: {:?}", "Variables".cyan(), self.variables)?;
        writeln!(f, "    {}: {:?}", "Kind".cyan(), self.kind)?;
        writeln!(f, "}}")
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {}", "Formula".cyan(), self.source)?;
        writeln!(f, "{}: {}", "Canonical".cyan(), self.canonical())?;
        writeln!(f, "{}: {}", "TeX".cyan(), self.fancy())?;
        write!(f, "{}: {}", "Variables".cyan(), self.variables.join(", "))
    }
}

impl Formula {
    /// Parses `source` without limiting its variables.
    ///
    /// # Example
    /// ```
    /// # use graphly::Formula;
    /// let formula = Formula::new("2x + y^2").unwrap();
    /// assert_eq!(formula.variables(), ["x", "y"]);
    /// assert_eq!(formula.canonical(), "((2 * x) + (y ^ 2))");
    /// ```
    pub fn new(source: &str) -> Result<Self, FormulaError> {
        let node = parse_str(source)?;
        Ok(Self::from_node(source.to_string(), node, None))
    }

    /// Parses `source` and rejects it when it uses more than `allowed` distinct variables.
    ///
    /// # Errors
    /// [`FormulaError::TooManyVariables`] listing the variables found.
    pub fn with_variable_limit(source: &str, allowed: usize) -> Result<Self, FormulaError> {
        let formula = Self::new(source)?;
        let count = formula.variables.len();
        if count > allowed {
            return Err(FormulaError::TooManyVariables {
                count,
                allowed,
                variables: formula.variables.join(", "),
            });
        }
        Ok(formula)
    }

    /// Parses `source` for an input slot of the given kind.
    pub fn for_input(source: &str, kind: InputKind) -> Result<Self, FormulaError> {
        let mut formula = Self::with_variable_limit(source, kind.allowed_variables())?;
        formula.kind = Some(kind);
        Ok(formula)
    }

    fn from_node(source: String, node: Node, kind: Option<InputKind>) -> Self {
        let variables = node.variables();
        debug!("formula {source} uses {variables:?}");
        Self {
            source,
            node,
            variables,
            kind,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Distinct variables in first-seen order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn kind(&self) -> Option<InputKind> {
        self.kind
    }

    pub fn eval(&self, bindings: &Bindings) -> f64 {
        self.node.evaluate(bindings)
    }

    /// Value with the first variable bound to `x`.
    pub fn eval_at(&self, x: f64) -> f64 {
        let mut bindings = Bindings::new();
        if let Some(variable) = self.variables.first() {
            bindings.insert(variable.clone(), x);
        }
        self.node.evaluate(&bindings)
    }

    pub fn tex(&self) -> String {
        self.node.to_tex()
    }

    /// TeX decorated for the input kind: `y = ...` or `... = 0`.
    pub fn fancy(&self) -> String {
        let tex = self.tex();
        match self.kind {
            Some(kind) => kind.fancy(&tex),
            None => tex,
        }
    }

    /// Fully parenthesised text that parses back to the same tree.
    pub fn canonical(&self) -> String {
        self.node.format(None)
    }

    /// Unsimplified derivative with respect to `variable`.
    pub fn derivative(&self, variable: &str) -> Formula {
        let node = self.node.derive(variable);
        Self::from_node(node.format(None), node, self.kind)
    }

    /// The formula sent through `simplifier`.
    pub fn simplified(&self, simplifier: &dyn Simplifier) -> Result<Formula, FormulaError> {
        let node = simplify(&self.node, simplifier)?;
        Ok(Self::from_node(node.format(None), node, self.kind))
    }

    /// Interpreted samples over the configured range.
    pub fn samples(&self, config: &SamplingConfig) -> Vec<Sample> {
        calc_values(&self.node, config)
    }

    /// Weighted minimum, typical value and weighted maximum over the configured range.
    pub fn important_ys(&self, config: &SamplingConfig) -> [f64; 3] {
        important_ys(&self.node, config)
    }

    /// JIT compiles the formula over its variables in first-seen order.
    pub fn compile(&self) -> Result<CompiledFormula, FormulaError> {
        let fun = build_function(&self.node, &self.variables)?;
        Ok(CompiledFormula {
            fun,
            variables: self.variables.clone(),
        })
    }
}

/// A formula compiled to native code.
#[derive(Clone)]
pub struct CompiledFormula {
    fun: JITFunction,
    variables: Vec<String>,
}

impl std::fmt::Debug for CompiledFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFormula")
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

impl CompiledFormula {
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn fun(&self) -> &JITFunction {
        &self.fun
    }

    fn validate_input_length(&self, values: &[f64]) -> Result<(), FormulaError> {
        if values.len() != self.variables.len() {
            return Err(FormulaError::InvalidInputLength {
                expected: self.variables.len(),
                got: values.len(),
            });
        }
        Ok(())
    }

    /// Evaluates at the given variable values, in [`CompiledFormula::variables`] order.
    ///
    /// # Errors
    /// Returns `FormulaError::InvalidInputLength` if the length of values doesn't match
    /// the number of variables.
    pub fn eval<V: Vector>(&self, values: &V) -> Result<f64, FormulaError> {
        self.validate_input_length(values.as_slice())?;
        Ok((self.fun)(values.as_slice()))
    }

    /// The y values over the configured range, computed in parallel.
    ///
    /// # Errors
    /// Returns `FormulaError::InvalidInputLength` for formulas with more than one variable,
    /// and when `V` cannot hold one value per sampled point (a fixed-size array of another
    /// length).
    pub fn sample<V: Vector>(&self, config: &SamplingConfig) -> Result<V, FormulaError> {
        if self.variables.len() > 1 {
            return Err(FormulaError::InvalidInputLength {
                expected: self.variables.len(),
                got: 1,
            });
        }
        let points = config.len();
        let mut ys = V::zeros(points).ok_or(FormulaError::InvalidInputLength {
            expected: points,
            got: V::FIXED_LEN.unwrap_or(0),
        })?;
        let fun = &self.fun;
        ys.as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, y)| {
                let x = config.x_min + i as f64 * config.step;
                *y = fun(&[x]);
            });
        Ok(ys)
    }
}
