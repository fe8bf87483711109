use super::*;

#[test]
fn scenario_1_hello_world_tokens() {
    let source = "\
.ORIG x3000
LEA R0, msg
PUTS
HALT
msg .STRINGZ \"Hi\"
.END
";
    let tokens = lex(source).expect("well-formed source lexes cleanly");
    let significant: Vec<&LexemeKind> = tokens
        .iter()
        .map(|t| &t.kind)
        .filter(|k| !matches!(k, LexemeKind::Newline { .. }))
        .collect();

    let expected = vec![
        LexemeKind::DotWord("ORIG".to_string()),
        LexemeKind::Integer { value: 0x3000, literal: "x3000".to_string() },
        LexemeKind::Word("LEA".to_string()),
        LexemeKind::Word("R0".to_string()),
        LexemeKind::Word("msg".to_string()),
        LexemeKind::Word("PUTS".to_string()),
        LexemeKind::Word("HALT".to_string()),
        LexemeKind::Word("msg".to_string()),
        LexemeKind::DotWord("STRINGZ".to_string()),
        LexemeKind::Str("Hi".to_string()),
        LexemeKind::DotWord("END".to_string()),
    ];

    assert_eq!(significant.len(), expected.len());
    for (actual, want) in significant.into_iter().zip(expected.iter()) {
        assert_eq!(actual, want);
    }
}

#[test]
fn word_equality_is_case_insensitive() {
    assert_eq!(LexemeKind::Word("add".to_string()), LexemeKind::Word("ADD".to_string()));
    assert_ne!(LexemeKind::Word("add".to_string()), LexemeKind::Word("and".to_string()));
}

#[test]
fn integer_literal_supports_decimal_hex_and_sign() {
    // The literal's digits are always ASCII decimal digits; `x`/`X` only
    // changes the radix they're interpreted under (spec.md §4.2) — so hex
    // literals here are restricted to digit characters 0-9, not A-F.
    let tokens = lex("#10 x10 #-5 x-20").unwrap();
    let values: Vec<i32> = tokens
        .iter()
        .filter_map(|t| match &t.kind {
            LexemeKind::Integer { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(values, vec![10, 16, -5, -32]);
}

#[test]
fn comment_and_quotes_are_stripped() {
    let tokens = lex("; a comment\n\"quoted\" 'c'").unwrap();
    assert_eq!(tokens[0].kind, LexemeKind::Comment(" a comment".to_string()));
    let kinds: Vec<&LexemeKind> = tokens.iter().map(|t| &t.kind).collect();
    assert!(kinds.contains(&&LexemeKind::Str("quoted".to_string())));
    assert!(kinds.contains(&&LexemeKind::Char("c".to_string())));
}

#[test]
fn unrecognized_input_is_tagged_invalid_not_dropped() {
    let err = lex("ADD R0, R1, $$$").unwrap_err();
    let invalid: Vec<&Token> = err.invalid_tokens().collect();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].kind, LexemeKind::Invalid("$$$".to_string()));
}

#[test]
fn token_spans_plus_separators_partition_the_source() {
    let source = "ADD R0, R1, R2\nHALT\n";
    let tokens = lex(source).expect("well-formed");

    let mut cursor_pos = 0usize;
    for token in &tokens {
        assert!(
            token.span.start >= cursor_pos,
            "token span {:?} overlaps previously consumed input (at {cursor_pos})",
            token.span
        );
        // Anything between the previous token's end and this one's start
        // must be nothing but skipped separator characters.
        let gap = &source[cursor_pos..token.span.start];
        assert!(gap.chars().all(|c| c == ',' || c == '\t' || c == ' '));
        cursor_pos = token.span.end;
    }
    assert_eq!(cursor_pos, source.len());
}

#[test]
fn every_token_span_round_trips_to_its_matched_text() {
    let source = ".ORIG x3000\nADD R1, R2, #3\n.END\n";
    let tokens = lex(source).expect("well-formed");
    for token in &tokens {
        let text = &source[token.span.start..token.span.end];
        match &token.kind {
            LexemeKind::DotWord(w) => assert_eq!(format!(".{w}"), text),
            LexemeKind::Word(w) => assert!(text.eq_ignore_ascii_case(w)),
            LexemeKind::Integer { literal, .. } => assert_eq!(literal, text),
            LexemeKind::Newline { .. } => assert!(text.starts_with(['\n', '\r'])),
            _ => {}
        }
    }
}
