mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::error;

use cli::Cli;
use cyk::{cyk::recognize, parser, render, tokenize::tokenize};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let grammar = match parser::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }
            error!("Could not read a grammar from {}", cli.file.display());
            return ExitCode::FAILURE;
        }
    };

    let grammar = match &cli.start {
        Some(start) => match grammar.with_start_symbol(start.as_str()) {
            Ok(grammar) => grammar,
            Err(errors) => {
                for e in &errors {
                    eprintln!("{}", e);
                }
                return ExitCode::FAILURE;
            }
        },
        None => grammar,
    };

    let mode = cli.token_mode();
    let tokens = tokenize(&cli.joined_word(), mode);
    let recognition = recognize(&grammar, &tokens);

    print!("{}", render::report(&grammar, &recognition, &tokens, mode, cli.quiet));

    ExitCode::SUCCESS
}
