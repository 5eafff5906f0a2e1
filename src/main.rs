use std::io::{self, Read};
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use parsley::{Dialect, ExpressionGrammar, parse, parse_prefix, stringify};

/// Parse an arithmetic expression and print it fully parenthesized
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Expression to parse. Read from stdin when omitted or `-`.
    expression: Option<String>,

    /// Only accept `+ - * /`, not the comparison operators `=` and `<>`.
    #[arg(long)]
    arithmetic: bool,

    /// Accept trailing text after the expression and print it.
    #[arg(long)]
    prefix: bool,

    /// Parse the input exactly as given, without trimming surrounding whitespace.
    #[arg(long)]
    no_trim: bool,
}

fn init_tracing() -> anyhow::Result<()> {
    // RUST_LOG selects which events are printed, e.g. RUST_LOG=parsley=trace
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("failed to initialise tracing filter")?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn read_source(cli: &Cli) -> anyhow::Result<String> {
    match cli.expression.as_deref() {
        Some(expression) if expression != "-" => Ok(expression.to_string()),
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read expression from stdin")?;
            Ok(source)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let source = read_source(&cli)?;
    let source = if cli.no_trim { source.as_str() } else { source.trim() };

    let dialect = if cli.arithmetic {
        Dialect::Arithmetic
    } else {
        Dialect::Comparison
    };
    let grammar = ExpressionGrammar::new(dialect);

    let outcome = if cli.prefix {
        parse_prefix(&grammar, source).map(|(expression, rest)| (expression, rest.to_string()))
    } else {
        parse(&grammar, source).map(|expression| (expression, String::new()))
    };

    match outcome {
        Ok((expression, rest)) => {
            println!("{}", stringify(&expression));
            if !rest.is_empty() {
                println!("rest: {rest}");
            }
            Ok(())
        }
        Err(_) => {
            eprintln!("invalid expression");
            process::exit(1);
        }
    }
}
