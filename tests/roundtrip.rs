use archon::{
    ast::Expr,
    driver::Driver,
    lexer::tokenize,
    parser::{Parser, PrecedenceTable},
};
use proptest::prelude::*;

fn parse(text: &str) -> Expr {
    let table = PrecedenceTable::standard();
    let mut parser = Parser::new(tokenize(text), &table);
    let expr = parser
        .parse_expression()
        .unwrap_or_else(|err| panic!("failed to parse `{text}`: {err}"));
    assert!(parser.is_at_end(), "trailing input after `{text}`");
    expr
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}".prop_filter("keywords aren't identifiers", |s| {
        s != "def" && s != "extern"
    })
}

fn number() -> impl Strategy<Value = f64> {
    // Literals are never negative. Display prints every finite f64 without
    // an exponent, so the whole range reparses.
    prop_oneof![
        (0u32..100_000).prop_map(|n| f64::from(n) / 8.0),
        0.0..f64::MAX,
        Just(f64::MAX),
    ]
}

fn operator() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['<', '+', '-', '*'])
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        number().prop_map(Expr::Number),
        ident().prop_map(Expr::Variable),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (operator(), inner.clone(), inner.clone()).prop_map(|(op, lhs, rhs)| {
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }),
            (ident(), prop::collection::vec(inner, 0..4))
                .prop_map(|(callee, args)| Expr::Call { callee, args }),
        ]
    })
}

// Operands joined by operators, with no grouping at all.
fn flat_text() -> impl Strategy<Value = String> {
    let operand = prop_oneof![
        number().prop_map(|n| n.to_string()),
        ident(),
        // Too large for an f64.
        "[1-9][0-9]{309,400}",
    ]
    .boxed();
    (operand.clone(), prop::collection::vec((operator(), operand), 0..8)).prop_map(
        |(first, rest)| {
            rest.into_iter()
                .fold(first, |text, (op, operand)| format!("{text} {op} {operand}"))
        },
    )
}

#[test]
fn overflowing_literal_reparses() {
    let text = format!("1{} + 2", "0".repeat(400));
    let parsed = parse(&text);
    let Expr::Binary { lhs, .. } = &parsed else {
        panic!("expected a binary expression, got {parsed}");
    };
    assert_eq!(**lhs, Expr::Number(f64::MAX));
    assert_eq!(parse(&parsed.to_string()), parsed);
}

proptest! {
    #[test]
    fn printed_ast_reparses(e in expr()) {
        prop_assert_eq!(parse(&e.to_string()), e);
    }

    #[test]
    fn reparse_is_stable(text in flat_text()) {
        let parsed = parse(&text);
        prop_assert_eq!(parse(&parsed.to_string()), parsed);
    }

    #[test]
    fn driver_terminates_on_any_input(text in "\\PC{0,64}") {
        let mut driver = Driver::new(PrecedenceTable::standard(), "fuzz");
        driver.run(&text);
    }
}
