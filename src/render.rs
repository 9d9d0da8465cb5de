/*
    This module formats grammars, CYK tables and verdicts as text
*/

use itertools::Itertools;

use crate::cyk::{CykTable, Recognition};
use crate::grammar::Grammar;
use crate::tokenize::TokenMode;

const RULE: &str = "====================================";

fn as_set(symbols: &[String]) -> String {
    format!("{{{}}}", symbols.join(", "))
}

pub fn grammar(grammar: &Grammar) -> String {
    let mut text = format!(
        "G = ({}, {}, P, {})\n\nProductions P:\n",
        as_set(grammar.terminals()),
        as_set(grammar.nonterminals()),
        grammar.start_symbol()
    );

    for (symbol, alternatives) in grammar.rules() {
        text.push_str(&format!("{} -> {}\n", symbol, alternatives.iter().join(" | ")));
    }

    text
}

// The text of every cell, row 0 first
fn cell_texts(table: &CykTable) -> Vec<Vec<String>> {
    let mut rows = vec![table.tokens().to_vec()];
    rows.extend(table.rows().map(|row| {
        row.iter()
            .map(|cell| if cell.is_empty() { "-".to_string() } else { cell.iter().join(",") })
            .collect_vec()
    }));
    rows
}

fn border(cells: usize, width: usize) -> String {
    format!("+{}", format!("{}+", "-".repeat(width + 2)).repeat(cells))
}

pub fn table(table: &CykTable) -> String {
    let rows = cell_texts(table);
    let width = rows.iter().flatten().map(|text| text.chars().count()).max().unwrap_or(0);

    let mut text = String::new();
    let mut above = 0usize;
    for row in &rows {
        text.push_str(&border(above.max(row.len()), width));
        text.push('\n');
        text.push('|');
        for cell in row {
            text.push_str(&format!(" {:<width$} |", cell, width = width));
        }
        text.push('\n');
        above = row.len();
    }
    text.push_str(&border(above, width));
    text.push('\n');

    text
}

fn word(tokens: &[String], mode: TokenMode) -> String {
    match mode {
        _ if tokens.is_empty() => "EPS (empty string)".to_string(),
        TokenMode::Characters => tokens.concat(),
        TokenMode::Words => tokens.join(" "),
    }
}

pub fn verdict(start_symbol: &str, tokens: &[String], mode: TokenMode, accepted: bool) -> String {
    format!(
        "{}\nStart Symbol: {}\nWord        : {}\nResult      : {}\n{}\n",
        RULE,
        start_symbol,
        word(tokens, mode),
        if accepted { "ACCEPTED" } else { "REJECTED" },
        RULE
    )
}

/// Everything printed for one run. The empty word has no table, so it only
/// gets the verdict.
pub fn report(grammar: &Grammar, recognition: &Recognition, tokens: &[String], mode: TokenMode, quiet: bool) -> String {
    let mut text = String::new();

    if !quiet {
        if let Some(cyk_table) = &recognition.table {
            text.push_str(&format!("Word: {}\n\n", word(tokens, mode)));
            text.push_str(&self::grammar(grammar));
            text.push_str("\nApplying CYK-Algorithm:\n\n");
            text.push_str(&table(cyk_table));
            text.push('\n');
        }
    }
    text.push_str(&verdict(grammar.start_symbol(), tokens, mode, recognition.accepted));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cyk::recognize;
    use crate::grammar::Declaration;

    fn ab_grammar() -> Grammar {
        Grammar::new("S", ["a", "b"], ["S", "A", "B"], vec![
            Declaration::new("S", ["A", "B"]),
            Declaration::new("S", ["*"]),
            Declaration::new("A", ["a"]),
            Declaration::new("B", ["b"]),
        ]).unwrap()
    }

    #[test]
    fn render_grammar() {
        assert_eq!(grammar(&ab_grammar()), concat!(
            "G = ({a, b}, {S, A, B}, P, S)\n",
            "\n",
            "Productions P:\n",
            "A -> a\n",
            "B -> b\n",
            "S -> A B | *\n"
        ));
    }

    #[test]
    fn render_table() {
        let recognition = recognize(&ab_grammar(), &["a", "b"]);

        assert_eq!(table(&recognition.table.unwrap()), concat!(
            "+---+---+\n",
            "| a | b |\n",
            "+---+---+\n",
            "| A | B |\n",
            "+---+---+\n",
            "| S |\n",
            "+---+\n"
        ));
    }

    #[test]
    fn render_empty_cells() {
        let recognition = recognize(&ab_grammar(), &["b", "a"]);

        assert_eq!(table(&recognition.table.unwrap()), concat!(
            "+---+---+\n",
            "| b | a |\n",
            "+---+---+\n",
            "| B | A |\n",
            "+---+---+\n",
            "| - |\n",
            "+---+\n"
        ));
    }

    #[test]
    fn report_empty_word() {
        let grammar = ab_grammar();
        let tokens: Vec<String> = Vec::new();
        let recognition = recognize(&grammar, &tokens);

        assert_eq!(
            report(&grammar, &recognition, &tokens, TokenMode::Characters, false),
            verdict("S", &tokens, TokenMode::Characters, true)
        );
    }

    #[test]
    fn report_word() {
        let grammar = ab_grammar();
        let tokens = vec!["a".to_string(), "b".to_string()];
        let recognition = recognize(&grammar, &tokens);

        let full = report(&grammar, &recognition, &tokens, TokenMode::Characters, false);
        assert!(full.starts_with("Word: ab\n\nG = ({a, b}, {S, A, B}, P, S)\n"));
        assert!(full.contains("\nApplying CYK-Algorithm:\n\n+---+---+\n"));
        assert!(full.ends_with(&verdict("S", &tokens, TokenMode::Characters, true)));

        assert_eq!(
            report(&grammar, &recognition, &tokens, TokenMode::Characters, true),
            verdict("S", &tokens, TokenMode::Characters, true)
        );
    }

    #[test]
    fn render_verdict() {
        let tokens = vec!["the".to_string(), "dog".to_string()];

        assert_eq!(verdict("S", &tokens, TokenMode::Words, false), concat!(
            "====================================\n",
            "Start Symbol: S\n",
            "Word        : the dog\n",
            "Result      : REJECTED\n",
            "====================================\n"
        ));
        assert!(verdict("S", &tokens, TokenMode::Characters, true).contains("Word        : thedog\nResult      : ACCEPTED\n"));
        assert!(verdict("S", &[], TokenMode::Characters, true).contains("Word        : EPS (empty string)\n"));
    }
}
