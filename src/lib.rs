#![cfg_attr(doc, warn(missing_docs))]
#![doc = include_str!("../README.md")]

pub mod isa;
pub mod lang;
pub mod machine;
pub mod repl;
