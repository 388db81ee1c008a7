use mamegen_core::DslError;

fn parse_err(source: &str) -> DslError {
    mamegen_dsl::compile(source).expect_err("source should be rejected")
}

fn wrap_rule(rule: &str) -> String {
    format!(
        "HEADER {{ [\"x\"] }}\nCOLUMN_RULES {{\n    LABEL \"x\" {{\n        {rule}\n    }}\n}}\n"
    )
}

#[test]
fn two_rules_on_one_line_are_rejected() {
    let err = parse_err(&wrap_rule("seq 1..10 digits 4"));
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn open_seq_range_is_rejected() {
    let err = parse_err(&wrap_rule("seq 1.."));
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn seq_without_range_is_rejected() {
    let err = parse_err(&wrap_rule("seq 1"));
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn inverted_seq_range_is_invalid() {
    let err = parse_err(&wrap_rule("seq 5..1"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn colon_in_rule_body_is_rejected() {
    let err = parse_err(&wrap_rule("length: 4"));
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn equals_in_config_is_rejected() {
    let err = parse_err("CONFIG {\n    count = 3\n}\nHEADER { [\"x\"] }\n");
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn inline_config_accepts_exactly_one_pair() {
    assert!(mamegen_dsl::compile("CONFIG { count 3 }\nHEADER { [\"x\"] }\n").is_ok());

    let err = parse_err("CONFIG { count 3 reproducible true }\nHEADER { [\"x\"] }\n");
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn unknown_config_key_is_invalid() {
    let err = parse_err("CONFIG {\n    verbosity 3\n}\nHEADER { [\"x\"] }\n");
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn count_must_be_positive() {
    let err = parse_err("CONFIG {\n    count 0\n}\nHEADER { [\"x\"] }\n");
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn reference_labels_must_be_quoted() {
    let err = parse_err(
        "HEADER { [\"x\"] }\nREFERENCE \"Q1\" {\n    unquoted 1\n}\n",
    );
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn reference_name_must_be_quoted() {
    let err = parse_err("HEADER { [\"x\"] }\nREFERENCE Q1 {\n    \"a\" 1\n}\n");
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn empty_reference_table_is_invalid() {
    let err = parse_err("HEADER { [\"x\"] }\nREFERENCE \"Q1\" {\n}\n");
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn reference_rows_take_one_pair_per_line() {
    let err = parse_err("HEADER { [\"x\"] }\nREFERENCE \"Q1\" {\n    \"a\" 1 \"b\" 2\n}\n");
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn allow_null_takes_a_boolean() {
    let err = parse_err(&wrap_rule("allow_null maybe"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn null_probability_is_bounded() {
    let err = parse_err(&wrap_rule("null_probability 1.5"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn digits_and_step_must_be_positive() {
    assert!(matches!(
        parse_err(&wrap_rule("digits 0")),
        DslError::InvalidRule { .. }
    ));
    assert!(matches!(
        parse_err(&wrap_rule("step 0")),
        DslError::InvalidRule { .. }
    ));
}

#[test]
fn digits_without_seq_is_invalid() {
    let err = parse_err(&wrap_rule("digits 4"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn unknown_charset_kind_is_invalid() {
    let err = parse_err(&wrap_rule("charset emoji"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn fixed_requires_number_or_quoted_string() {
    let err = parse_err(&wrap_rule("fixed hello"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn enum_requires_a_non_empty_list() {
    let err = parse_err(&wrap_rule("enum []"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn inverted_range_is_invalid() {
    let err = parse_err(&wrap_rule("range 10..1"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn date_range_validates_its_bounds() {
    assert!(matches!(
        parse_err(&wrap_rule("date_range \"2020-13-01\"..\"2020-12-31\"")),
        DslError::InvalidRule { .. }
    ));
    assert!(matches!(
        parse_err(&wrap_rule("date_range \"2021-01-01\"..\"2020-01-01\"")),
        DslError::InvalidRule { .. }
    ));
}

#[test]
fn output_side_is_label_or_value() {
    let err = parse_err(&wrap_rule("output both"));
    assert!(matches!(err, DslError::InvalidRule { .. }), "got {err:?}");
}

#[test]
fn unknown_rule_keyword_is_a_syntax_error() {
    let err = parse_err(&wrap_rule("sparkle 3"));
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn unknown_section_is_a_syntax_error() {
    let err = parse_err("HEADER { [\"x\"] }\nFOOTER { }\n");
    assert!(matches!(err, DslError::Syntax { .. }), "got {err:?}");
}

#[test]
fn syntax_errors_carry_the_source_line() {
    let err = parse_err(&wrap_rule("seq 1.."));
    match err {
        DslError::Syntax { line, .. } => assert_eq!(line, 4),
        other => panic!("expected syntax error, got {other:?}"),
    }
}
