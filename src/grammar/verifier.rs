use std::collections::HashSet;

use super::{Alternative, Declaration, GrammarError, GrammarErrors, EMPTY_MARKER};
use super::GrammarErrorType::*;
use crate::error_handling::Location;

// Lookup sets over the declared symbols of a grammar under construction
pub struct SymbolTable<'a> {
    terminals: &'a [String],
    terminal_set: HashSet<&'a str>,
    nonterminal_set: HashSet<&'a str>,
}

fn error_at(location: &Location, error: super::GrammarErrorType) -> GrammarError {
    GrammarError {
        location: location.to_owned(),
        error
    }
}

impl<'a> SymbolTable<'a> {
    pub fn new(terminals: &'a [String], nonterminals: &'a [String]) -> Self {
        SymbolTable {
            terminals,
            terminal_set: terminals.iter().map(String::as_str).collect(),
            nonterminal_set: nonterminals.iter().map(String::as_str).collect(),
        }
    }

    fn is_terminal(&self, symbol: &str) -> bool {
        self.terminal_set.contains(symbol)
    }

    fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminal_set.contains(symbol)
    }

    // Checks the declared symbol sets and the start symbol
    pub fn verify(&self, start_symbol: &str) -> GrammarErrors {
        let location = Location::default();
        let mut errors = Vec::new();

        for terminal in self.terminals {
            if self.is_nonterminal(terminal) {
                errors.push(error_at(&location, TerminalNonterminal(terminal.clone())));
            }
            if terminal == EMPTY_MARKER {
                errors.push(error_at(&location, ReservedTerminal));
            }
        }

        if !self.is_nonterminal(start_symbol) {
            errors.push(error_at(&location, StartNotNonterminal(start_symbol.to_owned())));
        }

        errors
    }

    // Turns the raw rewrite tokens of a declaration into an alternative,
    // reporting everything wrong with the declaration
    pub fn shape(&self, declaration: &Declaration) -> Result<Alternative, GrammarErrors> {
        let location = &declaration.location;
        let mut errors = Vec::new();

        if !self.is_nonterminal(&declaration.symbol) {
            errors.push(error_at(location, UndeclaredLeftSide(declaration.symbol.clone())));
        }

        let alternative = match declaration.rewrite.as_slice() {
            [single] if single == EMPTY_MARKER => Some(Alternative::Empty),
            [single] if self.is_terminal(single) => Some(Alternative::Terminal(single.clone())),
            [single] if self.is_nonterminal(single) => {
                errors.push(error_at(location, UnitProduction(single.clone())));
                None
            }
            [single] => {
                errors.push(error_at(location, UndefinedTerminal(single.clone())));
                None
            }
            [left, right] => {
                errors.extend(
                    [left, right].into_iter()
                        .filter(|symbol| !self.is_nonterminal(symbol))
                        .map(|symbol| error_at(location, UndefinedNonterminal(symbol.clone())))
                );
                Some(Alternative::Pair(left.clone(), right.clone()))
            }
            tokens => {
                errors.push(error_at(location, MalformedAlternative(tokens.to_vec())));
                None
            }
        };

        match alternative {
            Some(alternative) if errors.is_empty() => Ok(alternative),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn strings(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shape_normal_declarations() {
        let terminals = strings(&["a", "b"]);
        let nonterminals = strings(&["S", "A"]);
        let table = SymbolTable::new(&terminals, &nonterminals);

        let declarations = vec![
            Declaration::new("S", ["A", "S"]),
            Declaration::new("A", ["b"]),
            Declaration::new("S", ["*"]),
        ];
        let answers = vec![
            Alternative::Pair("A".to_string(), "S".to_string()),
            Alternative::Terminal("b".to_string()),
            Alternative::Empty,
        ];

        for (declaration, answer) in zip(declarations, answers) {
            assert_eq!(table.shape(&declaration), Ok(answer));
        }
    }

    #[test]
    fn shape_keeps_location() {
        let terminals = strings(&["a"]);
        let nonterminals = strings(&["S"]);
        let table = SymbolTable::new(&terminals, &nonterminals);
        let location = Location::new("g.cnf".into(), 5);

        let errors = table.shape(&Declaration::new("S", ["a", "S"]).at(location.clone())).unwrap_err();
        assert_eq!(errors, vec![error_at(&location, UndefinedNonterminal("a".to_string()))]);
    }

    #[test]
    fn verify_symbols() {
        let terminals = strings(&["a", "*"]);
        let nonterminals = strings(&["S", "a"]);
        let table = SymbolTable::new(&terminals, &nonterminals);

        let errors = table.verify("T").into_iter().map(|e| e.error).collect::<Vec<_>>();
        assert_eq!(errors, vec![
            TerminalNonterminal("a".to_string()),
            ReservedTerminal,
            StartNotNonterminal("T".to_string()),
        ]);
        assert!(table.verify("S").len() == 2);
    }
}
