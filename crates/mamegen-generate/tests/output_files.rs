use std::fs;
use std::path::PathBuf;

use mamegen_core::{CellValue, Program};
use mamegen_generate::output::{write_rows_csv, write_rows_json};
use mamegen_generate::{GenerateOptions, GenerationEngine};

fn compile(source: &str) -> Program {
    mamegen_dsl::compile(source).expect("program should compile")
}

fn generate(program: &Program) -> Vec<Vec<CellValue>> {
    GenerationEngine::new(GenerateOptions::default())
        .run(program)
        .expect("generation should succeed")
}

fn temp_file(label: &str, extension: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("mamegen_output_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir.join(format!("out.{extension}"))
}

const PROGRAM: &str = r#"
CONFIG {
    count 2
    reproducible true
}
HEADER { ["id", "label"] }
COLUMN_RULES {
    LABEL "id" {
        seq 1..10
        digits 3
    }
    LABEL "label" {
        fixed "item"
    }
}
"#;

#[test]
fn csv_quotes_everything_by_default() {
    let program = compile(PROGRAM);
    let rows = generate(&program);
    let path = temp_file("quoted", "csv");

    write_rows_csv(&path, &program.header, &rows, &program.config).expect("write csv");
    let contents = fs::read_to_string(&path).expect("read csv");
    assert_eq!(
        contents,
        "\"id\",\"label\"\n\"001\",\"item\"\n\"002\",\"item\"\n"
    );
}

#[test]
fn csv_header_quoting_is_independent() {
    let mut program = compile(PROGRAM);
    program.config.quote_header = false;
    let rows = generate(&program);
    let path = temp_file("bare_header", "csv");

    write_rows_csv(&path, &program.header, &rows, &program.config).expect("write csv");
    let contents = fs::read_to_string(&path).expect("read csv");
    assert!(contents.starts_with("id,label\n"));
    assert!(contents.contains("\"001\",\"item\""));
}

#[test]
fn csv_minimal_quoting_leaves_plain_fields_bare() {
    let mut program = compile(PROGRAM);
    program.config.quote_strings = false;
    program.config.quote_header = false;
    let rows = generate(&program);
    let path = temp_file("minimal", "csv");

    write_rows_csv(&path, &program.header, &rows, &program.config).expect("write csv");
    let contents = fs::read_to_string(&path).expect("read csv");
    assert_eq!(contents, "id,label\n001,item\n002,item\n");
}

#[test]
fn csv_can_drop_the_header() {
    let mut program = compile(PROGRAM);
    program.config.with_header = false;
    program.config.quote_strings = false;
    let rows = generate(&program);
    let path = temp_file("headerless", "csv");

    write_rows_csv(&path, &program.header, &rows, &program.config).expect("write csv");
    let contents = fs::read_to_string(&path).expect("read csv");
    assert_eq!(contents, "001,item\n002,item\n");
}

#[test]
fn json_keys_rows_by_column_name() {
    let program = compile(PROGRAM);
    let rows = generate(&program);
    let path = temp_file("objects", "json");

    write_rows_json(&path, &program.header, &rows).expect("write json");
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read json")).expect("parse json");

    let records = parsed.as_array().expect("array of rows");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], serde_json::json!("001"));
    assert_eq!(records[0]["label"], serde_json::json!("item"));
}

#[test]
fn json_serialises_empty_as_null_and_numbers_as_numbers() {
    let program = compile(
        r#"
CONFIG {
    count 1
    reproducible true
}
HEADER { ["n", "blank"] }
COLUMN_RULES {
    LABEL "n" {
        fixed 42
    }
    LABEL "blank" {
        charset alnum
        length 3
        null_probability 1.0
    }
}
"#,
    );
    let rows = generate(&program);
    let path = temp_file("nulls", "json");

    write_rows_json(&path, &program.header, &rows).expect("write json");
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read json")).expect("parse json");

    assert_eq!(parsed[0]["n"], serde_json::json!(42));
    assert_eq!(parsed[0]["blank"], serde_json::Value::Null);
}

#[test]
fn reproducible_pipeline_writes_identical_bytes() {
    let program = compile(PROGRAM);

    let path_a = temp_file("bytes_a", "csv");
    let rows = generate(&program);
    write_rows_csv(&path_a, &program.header, &rows, &program.config).expect("write csv A");

    let path_b = temp_file("bytes_b", "csv");
    let rows = generate(&program);
    write_rows_csv(&path_b, &program.header, &rows, &program.config).expect("write csv B");

    assert_eq!(
        fs::read(&path_a).expect("read A"),
        fs::read(&path_b).expect("read B")
    );
}
