/*
    This module splits an input word into terminal symbols
*/

use itertools::Itertools;

// Written in place of a word to ask about the empty string
pub const EMPTY_WORD: &str = "eps";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMode {
    // Every character is a terminal
    Characters,
    // Every whitespace-delimited word is a terminal
    Words,
}

pub fn tokenize(word: &str, mode: TokenMode) -> Vec<String> {
    match mode {
        TokenMode::Characters if word.eq_ignore_ascii_case(EMPTY_WORD) => Vec::new(),
        TokenMode::Characters => word.chars().map(String::from).collect_vec(),
        TokenMode::Words => word.split_whitespace().map(str::to_owned).collect_vec(),
    }
}
