use super::*;
use crate::lexer::lex;
use crate::parser::parse;

fn assemble(source: &str) -> Result<(Address, Vec<u16>), Vec<AssemblerError>> {
    let tokens = lex(source).expect("well-formed source lexes cleanly");
    let lines = parse(&tokens).map_err(|e| vec![e])?;
    assemble_lines(&lines)
}

fn pre_assemble(source: &str) -> Result<(Vec<(Address, crate::parser::ast::Line)>, SymbolTable), Vec<AssemblerError>> {
    let tokens = lex(source).expect("well-formed source lexes cleanly");
    let lines = parse(&tokens).map_err(|e| vec![e])?;
    pre_assemble_lines(&lines)
}

#[test]
fn scenario_2_hello_world() {
    let source = "\
.ORIG x3000
LEA R0, msg
PUTS
HALT
msg .STRINGZ \"Hi\"
.END
";
    let (origin, body) = assemble(source).expect("well-formed program assembles");
    assert_eq!(origin.value(), 0x3000);
    assert_eq!(body, vec![0xE002, 0xF022, 0xF025, 0x0048, 0x0069, 0x0000]);
}

#[test]
fn pre_assemble_stops_after_pass_1_without_encoding() {
    let source = ".ORIG x3000\nloop HALT\n.END\n";
    let (statements, symbols) = pre_assemble(source).expect("well-formed program pre-assembles");
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].0.value(), 0x3000);
    let address = symbols
        .get(
            &crate::parser::ast::Label::new("loop", crate::error::Span::point(0)).unwrap(),
            crate::error::Span::point(0),
        )
        .unwrap();
    assert_eq!(address.value(), 0x3000);
}

#[test]
fn scenario_3_duplicate_label_is_anchored_at_the_second_definition() {
    let source = ".ORIG x3000\nfoo .FILL #0\nfoo .FILL #1\n.END\n";
    let errors = assemble(source).unwrap_err();
    match &errors[0] {
        AssemblerError::DuplicateLabel { label, span, .. } => {
            assert_eq!(label, "foo");
            let second_foo = source.match_indices("foo").nth(1).unwrap().0;
            assert_eq!(span.start, second_foo);
        }
        other => panic!("expected DuplicateLabel, got {other:?}"),
    }
}

#[test]
fn scenario_4_offset_out_of_range() {
    let mut source = String::from(".ORIG x3000\nLEA R0, far\n");
    for _ in 0..300 {
        source.push_str("AND R0, R0, #0\n");
    }
    source.push_str("far .FILL #0\n.END\n");
    let errors = assemble(&source).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, AssemblerError::OffsetOutOfRange { .. })));
}

#[test]
fn undefined_label_reference_fails_at_pass_2() {
    let errors = assemble(".ORIG x3000\nLEA R0, nowhere\n.END\n").unwrap_err();
    assert!(matches!(errors[0], AssemblerError::UndefinedLabel { .. }));
}

#[test]
fn bit_exact_round_trip_for_a_label_free_program() {
    let (_, body) = assemble(".ORIG x3000\nADD R1, R2, R3\nNOT R0, R1\nRET\n.END\n").unwrap();
    assert_eq!(body[0], 0b0001_001_010_0_00_011);
    assert_eq!(body[1], 0b1001_000_001_111111);
    assert_eq!(body[2], 0xC1C0);
}

#[test]
fn fill_with_a_label_emits_its_resolved_address() {
    let source = ".ORIG x3000\n.FILL target\ntarget HALT\n.END\n";
    let (_, body) = assemble(source).unwrap();
    let (_, symbols) = pre_assemble(source).unwrap();
    let target = symbols
        .get(&crate::parser::ast::Label::new("target", crate::error::Span::point(0)).unwrap(), crate::error::Span::point(0))
        .unwrap();
    assert_eq!(body[0], target.value());
    assert_eq!(target.value(), 0x3001);
}

#[test]
fn missing_orig_is_reported_for_a_program_with_no_origin() {
    let errors = assemble("ADD R0, R0, #1\n").unwrap_err();
    assert!(matches!(errors[0], AssemblerError::MissingOrig { .. }));
}

#[test]
fn pass_2_accumulates_errors_across_multiple_statements() {
    let source = ".ORIG x3000\nLEA R0, nowhere\nLD R1, alsogone\n.END\n";
    let errors = assemble(source).unwrap_err();
    assert_eq!(errors.len(), 2);
}
