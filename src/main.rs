use clap::{Parser as ClapParser, Subcommand};
use lens_formula::cli::{self, CheckOptions, CheckResult, CliError, SubstituteOptions};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "formula")]
#[command(
    about = "Inspect dashboard formulas: aggregation references, pipeline operations and arithmetic trees"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a formula and print its references and raw tree
    Check {
        /// The formula (reads from stdin if not provided)
        formula: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't print the outcome
        #[arg(long)]
        syntax_only: bool,
    },

    /// Parse a formula and print the tree with generated identifiers
    Substitute {
        /// The formula (reads from stdin if not provided)
        formula: Option<String>,

        /// Identifier prefix; aggregation i becomes <prefix><i>
        #[arg(long, default_value = "col-")]
        prefix: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List function categories, or the functions in one category
    Functions {
        /// Category name (aggregations, pipelines, math, operators)
        category: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            formula,
            pretty,
            syntax_only,
        } => run_check(formula, pretty, syntax_only),
        Commands::Substitute {
            formula,
            prefix,
            pretty,
        } => run_substitute(formula, prefix, pretty),
        Commands::Functions { category: None } => {
            print!("{}", cli::get_functions_overview());
            Ok(())
        }
        Commands::Functions {
            category: Some(category),
        } => cli::get_functions_doc(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_formula(formula: Option<String>) -> Result<String, CliError> {
    match formula {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_check(formula: Option<String>, pretty: bool, syntax_only: bool) -> Result<(), CliError> {
    let options = CheckOptions {
        formula: read_formula(formula)?,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => print_json(&output, pretty)?,
    }
    Ok(())
}

fn run_substitute(formula: Option<String>, prefix: String, pretty: bool) -> Result<(), CliError> {
    let options = SubstituteOptions {
        formula: read_formula(formula)?,
        prefix,
    };

    let tree = cli::execute_substitute(&options)?;
    print_json(&tree, pretty)
}
