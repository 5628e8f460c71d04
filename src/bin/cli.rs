use clap::{Parser, Subcommand};
use colored::Colorize;
use graphly::derivations::format_smart;
use graphly::prelude::*;
use graphly::sampling::{important_ys, summarize, y_domain};
use graphly::types::Bindings;
use std::process;

#[derive(Parser)]
#[command(name = "graphly")]
#[command(about = "Parse, differentiate and sample formulas")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the canonical form, TeX, variables and tree of a formula
    Inspect {
        formula: String,
    },
    /// Evaluate a formula, e.g. `eval "x^2 + y" --at x=2 --at y=1`
    Eval {
        formula: String,
        /// Variable binding as `name=value`; unbound variables are 0
        #[arg(long = "at", value_parser = parse_binding)]
        at: Vec<(String, f64)>,
    },
    /// Differentiate a formula and simplify the result
    Derive {
        formula: String,
        /// Variable to differentiate by; defaults to the first one used
        #[arg(long)]
        variable: Option<String>,
        /// Treat the formula as `F(x, y) = 0` and print dy/dx
        #[arg(long, conflicts_with = "variable")]
        implicit: bool,
    },
    /// Print `x,y` rows over a range followed by a summary
    Sample {
        formula: String,
        #[arg(long, default_value_t = -10.0, allow_negative_numbers = true)]
        from: f64,
        #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
        to: f64,
        #[arg(long, default_value_t = 0.01)]
        step: f64,
        /// Sample through a JIT-compiled function
        #[arg(long)]
        jit: bool,
    },
}

fn parse_binding(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args.command) {
        eprintln!("{}: {}", "Error".red(), e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), FormulaError> {
    match command {
        Command::Inspect { formula } => {
            let formula = Formula::new(&formula)?;
            println!("{formula}");
            println!("{}:\n{}", "Tree".cyan(), formula.node().tree());
        }
        Command::Eval { formula, at } => {
            let formula = Formula::new(&formula)?;
            let bindings: Bindings = at.into_iter().collect();
            println!("{}", formula.eval(&bindings));
        }
        Command::Derive {
            formula,
            variable,
            implicit,
        } => {
            let formula = if implicit {
                Formula::for_input(&formula, InputKind::Implicit)?
            } else {
                Formula::new(&formula)?
            };
            let derivative = match (implicit, variable) {
                (true, _) => derive_implicit(formula.node(), &Algebraic)?,
                (false, Some(variable)) => {
                    derive_and_simplify(formula.node(), &variable, &Algebraic)?
                }
                (false, None) => derive_smart(formula.node(), &Algebraic)?,
            };
            println!("{}: {}", "Derivative".cyan(), derivative);
            println!("{}: {}", "Smart".cyan(), format_smart(&derivative));
            println!("{}: {}", "TeX".cyan(), derivative.to_tex());
        }
        Command::Sample {
            formula,
            from,
            to,
            step,
            jit,
        } => {
            let formula = Formula::for_input(&formula, InputKind::Explicit)?;
            let config = SamplingConfig {
                x_min: from,
                x_max: to,
                step,
            };
            let samples: Vec<(f64, f64)> = if jit {
                let ys: Vec<f64> = formula.compile()?.sample(&config)?;
                config.xs().zip(ys).collect()
            } else {
                formula.samples(&config)
            };
            for (x, y) in &samples {
                println!("{x},{y}");
            }
            if let Some(summary) = summarize(&samples) {
                eprintln!("{}: {:?}", "Summary".cyan(), summary);
            }
            let (y_min, y_max) = y_domain(&important_ys(formula.node(), &config));
            eprintln!("{}: [{}, {}]", "Y domain".cyan(), y_min, y_max);
        }
    }
    Ok(())
}
