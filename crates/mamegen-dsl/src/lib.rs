//! DSL front-end for mamegen.
//!
//! Turns `.mgen` source text into the validated program IR defined in
//! `mamegen-core`: tokenise (`lexer`), build a concrete section tree
//! (`parser`), then resolve and flatten it (`analyser`).

pub mod analyser;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

use mamegen_core::{Program, Result};

/// Parse source text into the concrete section tree.
pub fn parse(source: &str) -> Result<Vec<ast::Section>> {
    let tokens = lexer::tokenize(source)?;
    parser::Parser::new(&tokens).parse()
}

/// Parse and analyse source text into the program IR.
pub fn compile(source: &str) -> Result<Program> {
    let sections = parse(source)?;
    analyser::analyse(&sections)
}
