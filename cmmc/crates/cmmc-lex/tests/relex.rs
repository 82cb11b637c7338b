//! Re-lexing round-trip: joining the lexemes of a token stream with
//! whitespace and lexing again must reproduce the same stream.

use cmmc_lex::{Lexer, StrSource, Token};
use cmmc_util::Handler;
use proptest::prelude::*;

fn lex(source: &str) -> Result<Vec<Token>, ()> {
    let handler = Handler::new();
    let mut lexer = Lexer::new(StrSource::new(source), &handler);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => return Ok(tokens),
            Err(_) => return Err(()),
        }
    }
}

const FIXED: &[&str] = &[
    "if", "else", "while", "int", "real", "void", "return", "+", "-", "*", "/", "=", "==", "<",
    "<>", ">", "(", ")", "{", "}", "[", "]", ",", ";",
];

/// A strategy over single valid CMM lexemes.
fn lexeme() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => proptest::sample::select(FIXED.to_vec()).prop_map(str::to_string),
        2 => "[a-z][a-zA-Z0-9]{0,6}",
        1 => "[a-z][a-z0-9]{0,3}_[a-z0-9]{1,3}",
        2 => (0i64..=9_999_999).prop_map(|n| n.to_string()),
        1 => (0i64..=9_999, 0u32..=9_999).prop_map(|(i, f)| format!("{}.{}", i, f)),
    ]
}

proptest! {
    #[test]
    fn relex_is_stable(lexemes in proptest::collection::vec(lexeme(), 0..40)) {
        let source = lexemes.join(" ");
        let first = lex(&source).expect("generated source must lex");

        let rejoined = first
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = lex(&rejoined).expect("relexed source must lex");

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(a.kind, b.kind);
            prop_assert_eq!(&a.lexeme, &b.lexeme);
            prop_assert_eq!(a.literal, b.literal);
        }
    }

    #[test]
    fn lexeme_count_matches_input(lexemes in proptest::collection::vec(lexeme(), 0..40)) {
        let source = lexemes.join(" ");
        let tokens = lex(&source).expect("generated source must lex");
        prop_assert_eq!(tokens.len(), lexemes.len());
    }
}
