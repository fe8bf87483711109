use super::cursor::StrCursor;
use super::recursive::Recursive;
use super::*;

#[test]
fn ordered_choice_prefers_first_successful_branch() {
    let a = string("foo");
    let b = string("foobar");
    let combined = a.otherwise(b);
    // PEG ordered choice: 'foo' matches and wins even though 'foobar' would
    // also have matched a longer prefix of the input.
    let result = combined.parse(StrCursor::new("foo"));
    assert_eq!(result, Ok("foo".to_string()));
}

#[test]
fn ordered_choice_falls_back_on_failure() {
    let a = string("foo");
    let b = string("bar");
    let combined = a.otherwise(b);
    assert_eq!(combined.parse(StrCursor::new("bar")), Ok("bar".to_string()));
}

#[test]
fn otherwise_returns_second_branch_error_verbatim_on_double_failure() {
    let a = string("foo");
    let b = string("bar");
    let combined = a.otherwise(b);
    let err = combined.parse(StrCursor::new("baz")).unwrap_err();
    assert_eq!(err.message, "expected 'bar'");
}

#[test]
fn then_combines_matched_text() {
    let greeting = string("hello").then(string(" world"));
    assert_eq!(greeting.parse(StrCursor::new("hello world")), Ok("hello world".to_string()));
}

#[test]
fn map_transforms_output() {
    let digits = regex(r"[0-9]+").map(|s| s.parse::<i32>().unwrap());
    assert_eq!(digits.parse(StrCursor::new("42")), Ok(42));
}

#[test]
fn try_map_propagates_failure_anchored_after_match() {
    let digits = regex(r"[0-9]+").try_map(|s| s.parse::<i32>().map_err(|_| "not a number".into()));
    let err = digits.parse(StrCursor::new("999999999999999999999")).unwrap_err();
    assert_eq!(err.message, "not a number");
}

#[test]
fn preskip_consumes_leading_whitespace() {
    let word = regex(r"[a-z]+").preskip(string(" "));
    assert_eq!(word.parse(StrCursor::new("   hi")), Ok("hi".to_string()));
}

#[test]
fn postskip_consumes_trailing_whitespace() {
    let word = regex(r"[a-z]+").postskip(string(" "));
    assert_eq!(word.parse(StrCursor::new("hi   ")), Ok("hi".to_string()));
}

#[test]
fn as_token_before_postskip_excludes_skipped_separators() {
    let word = regex(r"[a-z]+").as_token().postskip(string(" "));
    let (_, token) = word.run(StrCursor::new("hi   ")).unwrap();
    assert_eq!(token.span, crate::error::Span::new(0, 2));
}

#[test]
fn as_token_after_postskip_includes_skipped_separators() {
    let word = regex(r"[a-z]+").postskip(string(" ")).as_token();
    let (_, token) = word.run(StrCursor::new("hi   ")).unwrap();
    assert_eq!(token.span, crate::error::Span::new(0, 5));
}

#[test]
fn optional_succeeds_with_none_on_mismatch() {
    let maybe_minus = optional(string("-"));
    let (rest, value) = maybe_minus.run(StrCursor::new("42")).unwrap();
    assert_eq!(value, None);
    assert_eq!(rest.pos(), 0);
}

#[test]
fn many0_collects_zero_or_more_matches() {
    let as_ = many0(string("a"));
    let (rest, value) = as_.run(StrCursor::new("aaab")).unwrap();
    assert_eq!(value, vec!["a", "a", "a"]);
    assert_eq!(rest.pos(), 3);
}

#[test]
fn parse_many_accumulates_until_end_of_input() {
    let token = regex(r"[a-z]+").preskip(string(" "));
    let words = token.parse_many(StrCursor::new("the quick fox"));
    assert_eq!(words, Ok(vec!["the".to_string(), "quick".to_string(), "fox".to_string()]));
}

/// A small arithmetic-expression grammar built from `Recursive`, exercising
/// left-to-right precedence climbing (`*`/`/` binding tighter than `+`/`-`)
/// and parenthesized grouping through genuine self-reference.
fn arithmetic_expr() -> Combinator<StrCursor, f64> {
    let expr: Recursive<StrCursor, f64> = Recursive::declare("expr");

    let number = regex(r"[0-9]+(?:\.[0-9]+)?")
        .map(|s| s.parse::<f64>().expect("regex guarantees a valid float"))
        .preskip(string(" "));

    let parenthesized = string("(")
        .preskip(string(" "))
        .consume(expr.as_combinator())
        .consume(string(")"))
        .postskip(string(" "));

    let atom = number.otherwise(parenthesized);

    let mul_op = string("*").otherwise(string("/")).preskip(string(" "));
    let factor = atom
        .clone()
        .cons(many0(mul_op.cons(atom)))
        .map(|(first, rest)| {
            rest.into_iter().fold(first, |acc, (op, value)| {
                if op == "*" { acc * value } else { acc / value }
            })
        });

    let add_op = string("+").otherwise(string("-")).preskip(string(" "));
    let expr_body = factor
        .clone()
        .cons(many0(add_op.cons(factor)))
        .map(|(first, rest)| {
            rest.into_iter().fold(first, |acc, (op, value)| {
                if op == "+" { acc + value } else { acc - value }
            })
        });

    expr.define(expr_body);
    expr.as_combinator().preskip(string(" "))
}

#[test]
fn arithmetic_demo_respects_operator_precedence() {
    let expr = arithmetic_expr();
    assert_eq!(expr.parse(StrCursor::new("12 + 8/2")), Ok(16.0));
}

#[test]
fn arithmetic_demo_respects_parentheses() {
    let expr = arithmetic_expr();
    assert_eq!(expr.parse(StrCursor::new("(1 + 2) * 3")), Ok(9.0));
}

#[test]
#[should_panic(expected = "used before define()")]
fn recursive_panics_if_called_before_define() {
    let undefined: Recursive<StrCursor, i32> = Recursive::declare("undefined");
    let combinator = undefined.as_combinator();
    let _ = combinator.run(StrCursor::new("1"));
}

#[test]
#[should_panic(expected = "must not be empty")]
fn string_rejects_empty_pattern() {
    let _ = string("");
}
