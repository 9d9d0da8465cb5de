/*
    This module parses grammar files

    The first three non-blank lines hold the start symbol, the terminals and
    the nonterminals. Every other line is a rule, either `S AB BA a` with one
    alternative per word, or `S -> A B | a` with `|` between alternatives.
    Lines starting with `;` are comments, except for the terminal and
    nonterminal lines, which are read as they are.
*/

mod lexer;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::debug;

use crate::error_handling::*;
use crate::grammar::*;
use lexer::*;

#[derive(Debug)]
pub enum CompileErrorType {
    // The file ended before the start symbol line
    MissingStartSymbol,
    // The file ended before the terminals line
    MissingTerminals,
    // The file ended before the nonterminals line
    MissingNonterminals,
    // A rule line starts with something other than a symbol
    MissingLeftSide,
    // A rule has no alternatives
    MissingAlternatives,
    // `->` somewhere other than right after the left-hand side
    UnexpectedArrow,
    // `|` with nothing on one side
    EmptyAlternative,
    // A comma-separated pair without exactly two symbols
    MalformedAlternative(String),
    // A word that splits into two nonterminals in more than one way
    AmbiguousAlternative(String),
    // The rules parsed but do not form a valid grammar
    Grammar(GrammarErrorType),
    // A blank line got too deep into the parser
    // This is a problem with the parser, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::MalformedAlternative(a), CompileErrorType::MalformedAlternative(b)) => a == b,
            (CompileErrorType::AmbiguousAlternative(a), CompileErrorType::AmbiguousAlternative(b)) => a == b,
            (CompileErrorType::Grammar(a), CompileErrorType::Grammar(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingStartSymbol => write!(f, "Expected a start symbol line"),
            CompileErrorType::MissingTerminals => write!(f, "Expected a line of terminals after the start symbol"),
            CompileErrorType::MissingNonterminals => write!(f, "Expected a line of nonterminals after the terminals"),
            CompileErrorType::MissingLeftSide => write!(f, "Expected a nonterminal at the start of the rule"),
            CompileErrorType::MissingAlternatives => write!(f, "Rule has no alternatives"),
            CompileErrorType::UnexpectedArrow => write!(f, "Unexpected `->` encountered"),
            CompileErrorType::EmptyAlternative => write!(f, "Empty alternative next to `|`"),
            CompileErrorType::MalformedAlternative(word) => write!(f, "`{}` must name exactly two nonterminals", word),
            CompileErrorType::AmbiguousAlternative(word) => write!(f, "`{}` splits into two nonterminals in more than one way; separate them with `,`", word),
            CompileErrorType::Grammar(e) => write!(f, "{}", e),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with the parser, not the grammar)"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location {
            file,
            line: 0
        },
        error: CompileErrorType::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// The first three lines of a grammar file
#[derive(PartialEq, Debug)]
struct Header {
    start_symbol: String,
    terminals: Vec<String>,
    nonterminals: Vec<String>
}

impl Header {
    fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.iter().any(|t| t == symbol)
    }
}

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    alternatives: Vec<Vec<String>>,
    location: Location
}

impl Rule {
    fn into_declarations(self) -> impl Iterator<Item = Declaration> {
        let Rule { symbol, alternatives, location } = self;
        alternatives.into_iter()
            .map(move |rewrite| Declaration::new(symbol.clone(), rewrite).at(location.clone()))
    }
}

// Works out the symbols of a single-word alternative. A word that is not a
// terminal or the empty marker is read as two nonterminals written together
fn split_word(word: &str, header: &Header) -> Result<Vec<String>> {
    if word == EMPTY_MARKER || header.is_terminal(word) {
        return Ok(vec![word.to_owned()]);
    }

    if word.contains(',') {
        return match word.split(',').collect_vec().as_slice() {
            [left, right] if !left.is_empty() && !right.is_empty() => Ok(vec![left.to_string(), right.to_string()]),
            _ => Err(CompileErrorType::MalformedAlternative(word.to_owned())),
        };
    }

    let is_nonterminal = |symbol: &str| header.nonterminals.iter().any(|n| n == symbol);
    let splits = word.char_indices()
        .skip(1)
        .map(|(index, _)| word.split_at(index))
        .filter(|(left, right)| is_nonterminal(*left) && is_nonterminal(*right))
        .collect_vec();

    match splits.as_slice() {
        [(left, right)] => Ok(vec![left.to_string(), right.to_string()]),
        // Leave it whole, the grammar reports what is wrong with it
        [] => Ok(vec![word.to_owned()]),
        _ => Err(CompileErrorType::AmbiguousAlternative(word.to_owned())),
    }
}

fn parse_alternative(tokens: &[Token], header: &Header) -> Result<Vec<String>> {
    // Bars are split off before this, so only a stray arrow can be left
    let words = tokens.iter().map(|t| match t {
        Token::Word(s) => Ok(s.as_str()),
        _ => Err(CompileErrorType::UnexpectedArrow)
    }).collect::<Result<Vec<_>>>()?;

    match words.as_slice() {
        [] => Err(CompileErrorType::EmptyAlternative),
        [word] => split_word(word, header),
        _ => Ok(words.iter().map(|w| w.to_string()).collect()),
    }
}

fn parse_rewrite(tokens: &[Token], header: &Header) -> Result<Vec<Vec<String>>> {
    match tokens.first() {
        None => Err(CompileErrorType::MissingAlternatives),
        // `S -> A B | a`
        Some(Token::Arrow) => {
            if tokens.len() == 1 {
                return Err(CompileErrorType::MissingAlternatives);
            }
            tokens[1..].split(|t| *t == Token::Or)
                .map(|alternative| parse_alternative(alternative, header))
                .collect()
        }
        // `S AB a`
        Some(_) => tokens.iter()
            .map(|token| parse_alternative(std::slice::from_ref(token), header))
            .collect(),
    }
}

fn parse_line(tokens: &[Token], header: &Header, location: Location) -> Result<Rule> {
    let symbol = match tokens.get(0) {
        Some(Token::Word(s)) => Ok(s.clone()),
        Some(_) => Err(CompileErrorType::MissingLeftSide),
        None => Err(CompileErrorType::UnexpectedBlankLine)
    }?;

    let alternatives = parse_rewrite(&tokens[1..], header)?;

    return Ok(Rule {
        symbol,
        alternatives,
        location
    });
}

// `->` and `|` are only syntax when the second word is `->` and `->` is not
// a terminal. Otherwise every word is taken literally, so `|` can be a terminal
fn lex_rule_line(line: &str, header: &Header) -> Result<Vec<Token>> {
    let words = lex_symbols(line);
    let arrow_form = words.get(1).is_some_and(|w| w == "->") && !header.is_terminal("->");

    if arrow_form {
        lexer::lex_line(line)
    } else {
        Ok(words.into_iter().map(Token::Word).collect())
    }
}

fn parse_lex_line(line: &str, header: &Header, location: Location) -> LineResult<Rule> {
    lex_rule_line(line, header)
        .and_then(|lexed_line| parse_line(&lexed_line, header, location.clone()))
        .map_err(|error| CompileError { location: location, error })
}

fn is_blank_line(line: &String) -> bool {
    line.trim().is_empty()
}

fn is_comment_line(line: &String) -> bool {
    line.trim_start().starts_with(';')
}

// Returns an iterator over the lines of a file, with the io errors wrapped
// in CompileError and enumerated
fn file_line_nums<'a>(file: File, path: &'a Path) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.to_path_buf())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(|line| !is_blank_line(line)) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

fn source_line_nums(source: &str) -> impl Iterator<Item = (usize, LineResult<String>)> + '_ {
    source.lines()
        .map(|line| Ok(line.to_owned()))
        .enumerate()
        .filter(|(_, line): &(usize, LineResult<String>)| line.as_ref().is_ok_and(|line| !is_blank_line(line)))
        .map(|(num, line)| (num + 1, line))
}

fn parse_header(lines: &mut impl Iterator<Item = (usize, String)>, path: &Path) -> LineResult<Header> {
    let missing = |error| CompileError {
        location: Location::new(path.to_path_buf(), 0),
        error
    };

    // Comments may come before the start symbol, but not inside the header
    let start_symbol = lines.find(|(_, line)| !is_comment_line(line))
        .and_then(|(_, line)| lex_symbols(&line).into_iter().next())
        .ok_or_else(|| missing(CompileErrorType::MissingStartSymbol))?;
    let (_, terminals) = lines.next().ok_or_else(|| missing(CompileErrorType::MissingTerminals))?;
    let (_, nonterminals) = lines.next().ok_or_else(|| missing(CompileErrorType::MissingNonterminals))?;

    Ok(Header {
        start_symbol,
        terminals: lex_symbols(&terminals),
        nonterminals: lex_symbols(&nonterminals)
    })
}

fn grammar_from_rules(header: Header, rules: Vec<Rule>, path: &Path) -> FileResult<Grammar> {
    debug!(
        "Building grammar from {} rules ({} terminals, {} nonterminals)",
        rules.len(),
        header.terminals.len(),
        header.nonterminals.len()
    );

    let declarations = rules.into_iter().flat_map(Rule::into_declarations);

    Grammar::new(header.start_symbol, header.terminals, header.nonterminals, declarations)
        .map_err(|errors| errors.into_iter().map(|e| CompileError {
            // Header problems have no line of their own
            location: if e.location == Location::default() {
                Location::new(path.to_path_buf(), 0)
            } else {
                e.location
            },
            error: CompileErrorType::Grammar(e.error)
        }).collect_vec())
}

fn grammar_from_lines(lines: impl Iterator<Item = (usize, LineResult<String>)>, path: &Path) -> FileResult<Grammar> {
    let (lines, errors): (Vec<_>, Vec<_>) = lines
        .map(|(num, line)| line.map(|line| (num, line)))
        .partition(LineResult::is_ok);
    if errors.len() > 0 {
        return Err(errors.into_iter().map(LineResult::unwrap_err).collect_vec());
    }
    let mut lines = lines.into_iter().map(LineResult::unwrap);

    let header = parse_header(&mut lines, path).map_err(|e| vec![e])?;

    let parsed_lines = lines.filter(|(_, line)| !is_comment_line(line)).map(|(num, line)| {
        parse_lex_line(&line, &header, Location {
            file: path.to_path_buf(),
            line: num
        })
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition(LineResult::is_ok);
    if errors.len() > 0 {
        return Err(errors.into_iter().map(LineResult::unwrap_err).collect_vec());
    }
    let rules_unwrapped = rules.into_iter().map(LineResult::unwrap).collect_vec();

    return grammar_from_rules(header, rules_unwrapped, path);
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.to_path_buf())])?;
    grammar_from_lines(file_line_nums(file, path), path)
}

// Parses grammar text that did not come from a file
pub fn parse_source(source: &str) -> FileResult<Grammar> {
    grammar_from_lines(source_line_nums(source), Path::new(""))
}
