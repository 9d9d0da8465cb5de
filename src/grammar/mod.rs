/*
    This module is for storing and querying grammars in Chomsky Normal Form
*/

mod verifier;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;

use itertools::Itertools;
use log::{debug, warn};

use crate::error_handling::*;
use verifier::SymbolTable;

// Right-hand side token that stands for the empty string
pub const EMPTY_MARKER: &str = "*";

// A set of nonterminals, as stored in every CYK cell
pub type Cell = BTreeSet<String>;

static NO_PRODUCERS: Cell = BTreeSet::new();

// One alternative of a rewrite rule. CNF only allows these three shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Alternative {
    Terminal(String),
    Pair(String, String),
    Empty,
}

impl Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alternative::Terminal(t) => write!(f, "{}", t),
            Alternative::Pair(left, right) => write!(f, "{} {}", left, right),
            Alternative::Empty => write!(f, "{}", EMPTY_MARKER),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum GrammarErrorType {
    // A rule is given for something that was not declared a nonterminal
    UndeclaredLeftSide(String),
    // A single-symbol alternative is not a declared terminal
    UndefinedTerminal(String),
    // A member of a pair alternative is not a declared nonterminal
    UndefinedNonterminal(String),
    // A single-symbol alternative names a nonterminal, which CNF forbids
    UnitProduction(String),
    // An alternative with no symbols or more than two
    MalformedAlternative(Vec<String>),
    // A symbol was declared both a terminal and a nonterminal
    TerminalNonterminal(String),
    // The empty marker was declared as a terminal
    ReservedTerminal,
    // The start symbol is not a declared nonterminal
    StartNotNonterminal(String),
}

impl ErrorType for GrammarErrorType {}

impl Display for GrammarErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarErrorType::UndeclaredLeftSide(s) => write!(f, "`{}` has productions but is not a declared nonterminal", s),
            GrammarErrorType::UndefinedTerminal(s) => write!(f, "`{}` is not a declared terminal", s),
            GrammarErrorType::UndefinedNonterminal(s) => write!(f, "`{}` is not a declared nonterminal", s),
            GrammarErrorType::UnitProduction(s) => write!(f, "Unit production to `{}` is not allowed in Chomsky Normal Form", s),
            GrammarErrorType::MalformedAlternative(tokens) => write!(
                f,
                "Alternative `{}` must be one terminal or exactly two nonterminals",
                tokens.join(" ")
            ),
            GrammarErrorType::TerminalNonterminal(s) => write!(f, "`{}` is declared as both a terminal and a nonterminal", s),
            GrammarErrorType::ReservedTerminal => write!(f, "`{}` is reserved for the empty string and cannot be a terminal", EMPTY_MARKER),
            GrammarErrorType::StartNotNonterminal(s) => write!(f, "Start symbol `{}` is not a declared nonterminal", s),
        }
    }
}

pub type GrammarError = Error<GrammarErrorType>;
pub type GrammarErrors = Errors<GrammarErrorType>;
pub type GrammarResult<T> = std::result::Result<T, GrammarErrors>;

// A single `symbol -> rewrite` line handed to the grammar builder. The rewrite
// is still raw tokens; the grammar decides which alternative shape it is
#[derive(Debug, PartialEq, Clone)]
pub struct Declaration {
    pub symbol: String,
    pub rewrite: Vec<String>,
    pub location: Location
}

impl Declaration {
    pub fn new<S: Into<String>>(symbol: impl Into<String>, rewrite: impl IntoIterator<Item = S>) -> Self {
        Declaration {
            symbol: symbol.into(),
            rewrite: rewrite.into_iter().map(Into::into).collect(),
            location: Location::default()
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    start_symbol: String,
    terminals: Vec<String>,
    nonterminals: Vec<String>,
    rules: BTreeMap<String, Vec<Alternative>>,
    // Reverse indexes used by the CYK fill
    unary: HashMap<String, Cell>,
    binary: HashMap<String, HashMap<String, Cell>>,
    nullable: Cell,
}

impl Grammar {
    /// Builds a grammar from its declared symbols and productions.
    ///
    /// Declarations for the same left-hand side are merged. Every validation
    /// failure is reported, not just the first one.
    pub fn new<T, N, D>(start_symbol: impl Into<String>, terminals: T, nonterminals: N, declarations: D) -> GrammarResult<Grammar>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
        D: IntoIterator<Item = Declaration>,
    {
        let start_symbol = start_symbol.into();
        let terminals: Vec<String> = terminals.into_iter().map(Into::into).unique().collect_vec();
        let nonterminals: Vec<String> = nonterminals.into_iter().map(Into::into).unique().collect_vec();

        let symbols = SymbolTable::new(&terminals, &nonterminals);
        let mut errors = symbols.verify(&start_symbol);

        let mut rules: BTreeMap<String, Vec<Alternative>> = BTreeMap::new();
        for declaration in declarations {
            match symbols.shape(&declaration) {
                Ok(alternative) => {
                    let alternatives = rules.entry(declaration.symbol.clone()).or_default();
                    if !alternatives.contains(&alternative) {
                        debug!("{} -> {}", declaration.symbol, alternative);
                        alternatives.push(alternative);
                    }
                }
                Err(declaration_errors) => errors.extend(declaration_errors),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut grammar = Grammar {
            start_symbol,
            terminals,
            nonterminals,
            rules,
            unary: HashMap::new(),
            binary: HashMap::new(),
            nullable: Cell::new(),
        };
        grammar.index();
        grammar.warn_stray_empty_rules();

        Ok(grammar)
    }

    fn index(&mut self) {
        for (symbol, alternatives) in &self.rules {
            for alternative in alternatives {
                match alternative {
                    Alternative::Terminal(t) => {
                        self.unary.entry(t.clone()).or_default().insert(symbol.clone());
                    }
                    Alternative::Pair(left, right) => {
                        self.binary
                            .entry(left.clone())
                            .or_default()
                            .entry(right.clone())
                            .or_default()
                            .insert(symbol.clone());
                    }
                    Alternative::Empty => {
                        self.nullable.insert(symbol.clone());
                    }
                }
            }
        }
    }

    // Nonterminals other than the start symbol with an empty alternative. The
    // fill never uses these
    pub fn stray_empty_rules(&self) -> Vec<&str> {
        self.nullable.iter()
            .filter(|symbol| **symbol != self.start_symbol)
            .map(String::as_str)
            .collect_vec()
    }

    fn warn_stray_empty_rules(&self) {
        for symbol in self.stray_empty_rules() {
            warn!("`{}` derives the empty string but is not the start symbol", symbol);
        }
    }

    /// Returns the same grammar recognising from a different start symbol.
    pub fn with_start_symbol(mut self, start_symbol: impl Into<String>) -> GrammarResult<Grammar> {
        let start_symbol = start_symbol.into();
        if !self.nonterminals.contains(&start_symbol) {
            return Err(vec![GrammarError {
                location: Location::default(),
                error: GrammarErrorType::StartNotNonterminal(start_symbol)
            }]);
        }
        self.start_symbol = start_symbol;
        self.warn_stray_empty_rules();
        Ok(self)
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminals
    }

    // Left-hand sides in sorted order with their alternatives in declaration order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Alternative])> {
        self.rules.iter().map(|(symbol, alternatives)| (symbol.as_str(), alternatives.as_slice()))
    }

    pub fn alternatives(&self, symbol: &str) -> &[Alternative] {
        self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every nonterminal with `alternative` among its alternatives.
    pub fn producers(&self, alternative: &Alternative) -> &Cell {
        match alternative {
            Alternative::Terminal(t) => self.producers_of_terminal(t),
            Alternative::Pair(left, right) => self.producers_of_pair(left, right),
            Alternative::Empty => &self.nullable,
        }
    }

    pub fn producers_of_terminal(&self, terminal: &str) -> &Cell {
        self.unary.get(terminal).unwrap_or(&NO_PRODUCERS)
    }

    pub fn producers_of_pair(&self, left: &str, right: &str) -> &Cell {
        self.binary
            .get(left)
            .and_then(|rights| rights.get(right))
            .unwrap_or(&NO_PRODUCERS)
    }

    pub fn nullable(&self, symbol: &str) -> bool {
        self.nullable.contains(symbol)
    }

    // Whether the empty word is in the language
    pub fn derives_empty(&self) -> bool {
        self.nullable(&self.start_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(left: &str, right: &str) -> Alternative {
        Alternative::Pair(left.to_string(), right.to_string())
    }

    fn terminal(t: &str) -> Alternative {
        Alternative::Terminal(t.to_string())
    }

    fn cell(symbols: &[&str]) -> Cell {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn ab_grammar() -> Grammar {
        Grammar::new("S", ["a", "b"], ["S", "A", "B"], vec![
            Declaration::new("S", ["A", "B"]),
            Declaration::new("A", ["a"]),
            Declaration::new("B", ["b"]),
        ]).unwrap()
    }

    #[test]
    fn shape_alternatives() {
        let grammar = Grammar::new("S", ["a"], ["S", "A"], vec![
            Declaration::new("S", ["A", "A"]),
            Declaration::new("S", ["*"]),
            Declaration::new("A", ["a"]),
        ]).unwrap();

        assert_eq!(grammar.alternatives("S"), &[pair("A", "A"), Alternative::Empty]);
        assert_eq!(grammar.alternatives("A"), &[terminal("a")]);
        assert_eq!(grammar.alternatives("B"), &[] as &[Alternative]);
    }

    #[test]
    fn merge_not_overwrite() {
        let grammar = Grammar::new("S", ["a", "b"], ["S"], vec![
            Declaration::new("S", ["a"]),
            Declaration::new("S", ["b"]),
            Declaration::new("S", ["a"]),
        ]).unwrap();

        assert_eq!(grammar.alternatives("S"), &[terminal("a"), terminal("b")]);
    }

    #[test]
    fn producers_lookup() {
        let grammar = Grammar::new("S", ["a", "b"], ["S", "A", "B"], vec![
            Declaration::new("S", ["A", "B"]),
            Declaration::new("B", ["A", "B"]),
            Declaration::new("A", ["a"]),
            Declaration::new("S", ["a"]),
            Declaration::new("B", ["b"]),
        ]).unwrap();

        assert_eq!(grammar.producers(&pair("A", "B")), &cell(&["B", "S"]));
        assert_eq!(grammar.producers(&terminal("a")), &cell(&["A", "S"]));
        assert_eq!(grammar.producers(&terminal("b")), &cell(&["B"]));
        assert_eq!(grammar.producers(&pair("B", "A")), &Cell::new());
        assert_eq!(grammar.producers(&terminal("c")), &Cell::new());
        assert_eq!(grammar.producers(&Alternative::Empty), &Cell::new());
    }

    #[test]
    fn producers_are_structural() {
        // "AB" + "C" and "A" + "BC" concatenate to the same string
        let grammar = Grammar::new("S", ["x"], ["S", "A", "AB", "BC", "C"], vec![
            Declaration::new("S", ["AB", "C"]),
            Declaration::new("A", ["x"]),
        ]).unwrap();

        assert_eq!(grammar.producers_of_pair("AB", "C"), &cell(&["S"]));
        assert_eq!(grammar.producers_of_pair("A", "BC"), &Cell::new());
    }

    #[test]
    fn empty_derivation() {
        let grammar = Grammar::new("S", ["a"], ["S", "A"], vec![
            Declaration::new("S", ["*"]),
            Declaration::new("S", ["A", "A"]),
            Declaration::new("A", ["a"]),
        ]).unwrap();
        assert!(grammar.derives_empty());
        assert!(!grammar.nullable("A"));

        assert!(!ab_grammar().derives_empty());
    }

    #[test]
    fn start_without_rules() {
        let grammar = Grammar::new("S", ["a"], ["S", "A"], vec![
            Declaration::new("A", ["a"]),
        ]).unwrap();

        assert!(grammar.alternatives("S").is_empty());
        assert!(!grammar.derives_empty());
    }

    #[test]
    fn stray_empty_rules_follow_start() {
        let grammar = Grammar::new("S", ["a"], ["S", "A"], vec![
            Declaration::new("S", ["*"]),
            Declaration::new("S", ["A", "A"]),
            Declaration::new("A", ["*"]),
            Declaration::new("A", ["a"]),
        ]).unwrap();
        assert_eq!(grammar.stray_empty_rules(), vec!["A"]);

        let grammar = grammar.with_start_symbol("A").unwrap();
        assert_eq!(grammar.stray_empty_rules(), vec!["S"]);
        assert!(grammar.derives_empty());

        assert!(ab_grammar().stray_empty_rules().is_empty());
    }

    #[test]
    fn override_start_symbol() {
        let grammar = ab_grammar().with_start_symbol("A").unwrap();
        assert_eq!(grammar.start_symbol(), "A");

        let errors = ab_grammar().with_start_symbol("a").unwrap_err();
        assert_eq!(errors[0].error, GrammarErrorType::StartNotNonterminal("a".to_string()));
    }

    #[test]
    fn malformed_grammar() {
        let errors = Grammar::new("S", ["a", "*"], ["S", "A", "a"], vec![
            Declaration::new("S", ["A"]),
            Declaration::new("S", ["A", "b"]),
            Declaration::new("S", ["A", "A", "A"]),
            Declaration::new("T", ["c"]),
            Declaration::new("A", Vec::<String>::new()),
        ]).unwrap_err();

        let error_types = errors.into_iter().map(|e| e.error).collect_vec();
        assert_eq!(error_types, vec![
            GrammarErrorType::TerminalNonterminal("a".to_string()),
            GrammarErrorType::ReservedTerminal,
            GrammarErrorType::UnitProduction("A".to_string()),
            GrammarErrorType::UndefinedNonterminal("b".to_string()),
            GrammarErrorType::MalformedAlternative(vec!["A".to_string(), "A".to_string(), "A".to_string()]),
            GrammarErrorType::UndeclaredLeftSide("T".to_string()),
            GrammarErrorType::UndefinedTerminal("c".to_string()),
            GrammarErrorType::MalformedAlternative(Vec::new()),
        ]);
    }

    #[test]
    fn display_alternatives() {
        assert_eq!(pair("NP", "VP").to_string(), "NP VP");
        assert_eq!(terminal("a").to_string(), "a");
        assert_eq!(Alternative::Empty.to_string(), "*");
    }
}
