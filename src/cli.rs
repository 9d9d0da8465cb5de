use std::path::PathBuf;

use clap::Parser;

use cyk::tokenize::TokenMode;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar in Chomsky Normal Form
    pub file: PathBuf,

    /// Word to test (`eps` for the empty word). Several words are read as tokens
    #[arg(required = true, num_args = 1.., value_name = "WORD")]
    pub word: Vec<String>,

    /// Split the word on whitespace instead of into characters
    #[arg(short, long)]
    pub tokens: bool,

    /// Start symbol (default: the one declared in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Only print the verdict
    #[arg(short, long)]
    pub quiet: bool
}

impl Cli {
    pub fn token_mode(&self) -> TokenMode {
        if self.tokens || self.word.len() > 1 {
            TokenMode::Words
        } else {
            TokenMode::Characters
        }
    }

    pub fn joined_word(&self) -> String {
        self.word.join(" ")
    }
}
