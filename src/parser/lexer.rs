use itertools::{Itertools, PeekingNext};

use super::Result;

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Or,
    Word(String)
}

pub fn lex_word(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    // Stop before `|` so it is lexed as its own token
    let text: String = line.peeking_take_while(|&c| !c.is_whitespace() && c != '|').collect();

    if text == "->" {
        Ok(Token::Arrow)
    } else {
        Ok(Token::Word(text))
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if !c.is_whitespace() {
            tokens.push(lex_word(&mut line_chars)?);
        } else {
            line_chars.next();
        }
    }

    return Ok(tokens);
}

// Splits a header line into its symbols
pub fn lex_symbols(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}
