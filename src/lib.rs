pub mod error_handling;
pub mod grammar;
pub mod cyk;
pub mod tokenize;
pub mod parser;
pub mod render;
