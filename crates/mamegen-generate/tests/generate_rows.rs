use mamegen_core::{CellValue, DslError, Program};
use mamegen_generate::{GenerateOptions, GenerationEngine};

fn compile(source: &str) -> Program {
    mamegen_dsl::compile(source).expect("program should compile")
}

fn generate(source: &str) -> Vec<Vec<CellValue>> {
    let program = compile(source);
    GenerationEngine::new(GenerateOptions::default())
        .run(&program)
        .expect("generation should succeed")
}

fn text(cell: &CellValue) -> String {
    cell.to_field()
}

const SYNC_REFERENCE: &str = r#"
CONFIG {
    count 3
    reproducible true
}
HEADER { ["a", "b"] }
REFERENCE "Q1" {
    "X" 1
    "Y" 2
}
COLUMN_RULES {
    LABEL "a" {
        reference "Q1"
        output label
    }
    LABEL "b" {
        reference "Q1"
        output value
    }
}
"#;

#[test]
fn sequential_ids_are_zero_padded() {
    let rows = generate(
        r#"
CONFIG {
    type CSV
    count 2
    reproducible true
}
HEADER { ["id"] }
COLUMN_RULES {
    LABEL "id" {
        seq 1..10
        digits 3
    }
}
"#,
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(text(&rows[0][0]), "001");
    assert_eq!(text(&rows[1][0]), "002");
}

#[test]
fn reproducible_runs_are_identical() {
    let source = r#"
CONFIG {
    count 20
    reproducible true
}
HEADER { ["s", "n", "d"] }
COLUMN_RULES {
    LABEL "s" {
        charset alphabet
        length 6
    }
    LABEL "n" {
        range 1..1000
    }
    LABEL "d" {
        date_range "2024-01-01".."2024-12-31"
    }
}
"#;
    assert_eq!(generate(source), generate(source));
}

#[test]
fn row_count_and_width_match_the_program() {
    let rows = generate(
        r#"
CONFIG {
    count 13
    reproducible true
}
HEADER { ["a", "b", "c"] }
COLUMN_RULES {
    LABEL "a" {
        range 1..5
    }
}
"#,
    );
    assert_eq!(rows.len(), 13);
    for row in &rows {
        assert_eq!(row.len(), 3);
    }
}

#[test]
fn synchronous_reference_columns_agree_per_row() {
    let rows = generate(SYNC_REFERENCE);
    assert_eq!(rows.len(), 3);
    for row in &rows {
        let pair = (text(&row[0]), row[1].clone());
        assert!(
            pair == ("X".to_string(), CellValue::Int(1))
                || pair == ("Y".to_string(), CellValue::Int(2)),
            "mismatched reference pair: {pair:?}"
        );
    }
}

#[test]
fn implicit_reverse_lookup_follows_the_label_column() {
    let rows = generate(
        r#"
CONFIG {
    count 5
    reproducible true
}
HEADER { ["a", "b"] }
REFERENCE "Q1" {
    "X" 1
    "Y" 2
}
COLUMN_RULES {
    LABEL "a" {
        reference "Q1"
        output label
    }
    LABEL "b" {
        reference "Q1"
        output value
        value_source
    }
}
"#,
    );
    for row in &rows {
        let expected = match text(&row[0]).as_str() {
            "X" => CellValue::Int(1),
            "Y" => CellValue::Int(2),
            other => panic!("unexpected label {other}"),
        };
        assert_eq!(row[1], expected);
    }
}

#[test]
fn explicit_reverse_lookup_matches_labels_and_values() {
    let rows = generate(
        r#"
CONFIG {
    count 4
    reproducible true
}
HEADER { ["code", "name"] }
REFERENCE "Q1" {
    "X" 1
    "Y" 2
}
COLUMN_RULES {
    LABEL "code" {
        reference "Q1"
        output value
    }
    LABEL "name" {
        reference "Q1"
        output label
        value_source "code"
    }
}
"#,
    );
    for row in &rows {
        let expected = match row[0] {
            CellValue::Int(1) => "X",
            CellValue::Int(2) => "Y",
            ref other => panic!("unexpected value {other:?}"),
        };
        assert_eq!(text(&row[1]), expected);
    }
}

#[test]
fn reverse_lookup_miss_emits_empty() {
    let rows = generate(
        r#"
CONFIG {
    count 2
    reproducible true
}
HEADER { ["src", "hit"] }
REFERENCE "Q1" {
    "X" 1
}
COLUMN_RULES {
    LABEL "src" {
        fixed "missing_value"
    }
    LABEL "hit" {
        reference "Q1"
        output value
        value_source "src"
    }
}
"#,
    );
    for row in &rows {
        assert!(row[1].is_empty());
    }
}

#[test]
fn strict_policy_raises_on_forbidden_empty() {
    let program = compile(
        r#"
CONFIG {
    count 2
    reproducible true
}
HEADER { ["src", "hit"] }
REFERENCE "Q1" {
    "X" 1
}
COLUMN_RULES {
    LABEL "src" {
        fixed "missing_value"
    }
    LABEL "hit" {
        reference "Q1"
        output value
        value_source "src"
        allow_null false
    }
}
"#,
    );
    let strict = GenerationEngine::new(GenerateOptions { strict_nulls: true });
    let err = strict.run(&program).expect_err("strict policy should raise");
    assert!(matches!(err, DslError::Generation { .. }), "got {err:?}");

    let lenient = GenerationEngine::new(GenerateOptions {
        strict_nulls: false,
    });
    let rows = lenient.run(&program).expect("lenient policy coerces");
    assert!(rows.iter().all(|row| row[1].is_empty()));
}

#[test]
fn last_writer_wins_across_selectors() {
    let rows = generate(
        r#"
CONFIG {
    count 3
    reproducible true
}
HEADER { ["col1", "col2"] }
COLUMN_RULES {
    INDICES [1, 2] {
        length 4
    }
    LABEL "col2" {
        length 9
    }
}
"#,
    );
    for row in &rows {
        assert_eq!(text(&row[0]).len(), 4);
        assert_eq!(text(&row[1]).len(), 9);
    }
}

#[test]
fn null_bound_holds_for_allow_null_false() {
    let rows = generate(
        r#"
CONFIG {
    count 50
    reproducible true
}
HEADER { ["a"] }
COLUMN_RULES {
    LABEL "a" {
        charset alnum
        length 3
        allow_null false
    }
}
"#,
    );
    assert!(rows.iter().all(|row| !row[0].is_empty()));
}

#[test]
fn null_probability_one_always_emits_empty() {
    let rows = generate(
        r#"
CONFIG {
    count 10
    reproducible true
}
HEADER { ["a"] }
COLUMN_RULES {
    LABEL "a" {
        charset alnum
        length 3
        null_probability 1.0
    }
}
"#,
    );
    assert!(rows.iter().all(|row| row[0].is_empty()));
}

#[test]
fn seq_wraps_to_start_past_its_end() {
    let rows = generate(
        r#"
CONFIG {
    count 5
    reproducible true
}
HEADER { ["n"] }
COLUMN_RULES {
    LABEL "n" {
        seq 1..3
    }
}
"#,
    );
    let values: Vec<i64> = rows.iter().map(|row| row[0].as_i64().unwrap()).collect();
    assert_eq!(values, vec![1, 2, 3, 1, 2]);
}

#[test]
fn seq_with_step_advances_by_step() {
    let rows = generate(
        r#"
CONFIG {
    count 3
    reproducible true
}
HEADER { ["n"] }
COLUMN_RULES {
    LABEL "n" {
        seq 10..100
        step 5
    }
}
"#,
    );
    let values: Vec<i64> = rows.iter().map(|row| row[0].as_i64().unwrap()).collect();
    assert_eq!(values, vec![10, 15, 20]);
}

#[test]
fn degenerate_bounds_are_constant() {
    let rows = generate(
        r#"
CONFIG {
    count 4
    reproducible true
}
HEADER { ["n", "d"] }
COLUMN_RULES {
    LABEL "n" {
        seq 7..7
    }
    LABEL "d" {
        date_range "2025-06-01".."2025-06-01"
    }
}
"#,
    );
    for row in &rows {
        assert_eq!(row[0], CellValue::Int(7));
        assert_eq!(text(&row[1]), "2025-06-01");
    }
}

#[test]
fn enum_picks_stay_in_the_list() {
    let rows = generate(
        r#"
CONFIG {
    count 30
    reproducible true
}
HEADER { ["status"] }
COLUMN_RULES {
    LABEL "status" {
        enum ["open", "closed", "pending"]
    }
}
"#,
    );
    for row in &rows {
        let value = text(&row[0]);
        assert!(["open", "closed", "pending"].contains(&value.as_str()));
    }
}

#[test]
fn int_range_draws_are_inclusive_integers() {
    let rows = generate(
        r#"
CONFIG {
    count 100
    reproducible true
}
HEADER { ["n"] }
COLUMN_RULES {
    LABEL "n" {
        range 1..3
    }
}
"#,
    );
    let mut seen = [false; 3];
    for row in &rows {
        let value = row[0].as_i64().expect("integer cell");
        assert!((1..=3).contains(&value));
        seen[(value - 1) as usize] = true;
    }
    assert!(seen.iter().all(|&hit| hit), "all values should appear");
}

#[test]
fn float_range_emits_floats_within_bounds() {
    let rows = generate(
        r#"
CONFIG {
    count 50
    reproducible true
}
HEADER { ["f"] }
COLUMN_RULES {
    LABEL "f" {
        range -1.0..1.0
    }
}
"#,
    );
    for row in &rows {
        match row[0] {
            CellValue::Float(value) => assert!((-1.0..=1.0).contains(&value)),
            ref other => panic!("expected float, got {other:?}"),
        }
    }
}

#[test]
fn copy_duplicates_an_earlier_cell() {
    let rows = generate(
        r#"
CONFIG {
    count 5
    reproducible true
}
HEADER { ["a", "b"] }
COLUMN_RULES {
    LABEL "a" {
        seq 1..100
    }
    LABEL "b" {
        copy "a"
    }
}
"#,
    );
    for row in &rows {
        assert_eq!(row[0], row[1]);
    }
}

#[test]
fn join_concatenates_cells_with_the_separator() {
    let rows = generate(
        r#"
CONFIG {
    count 2
    reproducible true
}
HEADER { ["a", "b", "key"] }
COLUMN_RULES {
    LABEL "a" {
        fixed "user"
    }
    LABEL "b" {
        seq 1..9
    }
    LABEL "key" {
        join "-" [a, b]
    }
}
"#,
    );
    assert_eq!(text(&rows[0][2]), "user-1");
    assert_eq!(text(&rows[1][2]), "user-2");
}

#[test]
fn pattern_rule_expands_the_minimal_syntax() {
    let rows = generate(
        r#"
CONFIG {
    count 20
    reproducible true
}
HEADER { ["code"] }
COLUMN_RULES {
    LABEL "code" {
        regex "[A-Z]{3}-[0-9]{2,4}"
    }
}
"#,
    );
    for row in &rows {
        let value = text(&row[0]);
        let (prefix, digits) = value.split_once('-').expect("dash in pattern output");
        assert_eq!(prefix.len(), 3);
        assert!(prefix.chars().all(|c| c.is_ascii_uppercase()));
        assert!((2..=4).contains(&digits.len()));
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn datetime_emits_iso_8601_to_the_second() {
    let rows = generate(
        r#"
CONFIG {
    count 3
    reproducible true
}
HEADER { ["ts"] }
COLUMN_RULES {
    LABEL "ts" {
        date_range "2024-03-01".."2024-03-02"
        datetime
    }
}
"#,
    );
    for row in &rows {
        let value = text(&row[0]);
        assert_eq!(value.len(), 19);
        assert_eq!(&value[..8], "2024-03-");
        assert_eq!(value.as_bytes()[10], b'T');
    }
}

#[test]
fn rule_less_columns_emit_empty_strings() {
    let rows = generate(
        r#"
CONFIG {
    count 2
    reproducible true
}
HEADER { ["a", "blank"] }
COLUMN_RULES {
    LABEL "a" {
        fixed 1
    }
}
"#,
    );
    for row in &rows {
        assert_eq!(row[1], CellValue::Text(String::new()));
    }
}

#[test]
fn fixed_values_keep_their_type() {
    let rows = generate(
        r#"
CONFIG {
    count 1
    reproducible true
}
HEADER { ["i", "f", "s"] }
COLUMN_RULES {
    LABEL "i" {
        fixed 42
    }
    LABEL "f" {
        fixed 1.5
    }
    LABEL "s" {
        fixed "hello"
    }
}
"#,
    );
    assert_eq!(rows[0][0], CellValue::Int(42));
    assert_eq!(rows[0][1], CellValue::Float(1.5));
    assert_eq!(rows[0][2], CellValue::Text("hello".to_string()));
}

#[test]
fn locks_are_cleared_between_records() {
    // With one reference row per label the lock pins each record to one
    // row, but across 30 records both rows must show up.
    let rows = generate(
        r#"
CONFIG {
    count 30
    reproducible true
}
HEADER { ["a"] }
REFERENCE "Q1" {
    "X" 1
    "Y" 2
}
COLUMN_RULES {
    LABEL "a" {
        reference "Q1"
        output label
    }
}
"#,
    );
    let labels: Vec<String> = rows.iter().map(|row| text(&row[0])).collect();
    assert!(labels.iter().any(|l| l == "X"));
    assert!(labels.iter().any(|l| l == "Y"));
}
