use std::env;
use std::path::PathBuf;

use mamegen_generate::output::write_rows_csv;
use mamegen_generate::{GenerateOptions, GenerationEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let spec_path: PathBuf = args.next().ok_or("usage: generate_rows <spec.mgen> [out.csv]")?.into();
    let out_path: Option<PathBuf> = args.next().map(PathBuf::from);

    let source = std::fs::read_to_string(&spec_path)?;
    let program = mamegen_dsl::compile(&source)?;

    let engine = GenerationEngine::new(GenerateOptions::default());
    let rows = engine.run(&program)?;

    match out_path {
        Some(path) => {
            write_rows_csv(&path, &program.header, &rows, &program.config)?;
            println!("wrote {} rows -> {}", rows.len(), path.display());
        }
        None => {
            for row in &rows {
                let fields: Vec<String> = row.iter().map(|cell| cell.to_field()).collect();
                println!("{}", fields.join(","));
            }
        }
    }
    Ok(())
}
