pub mod assembler;
pub mod naming;
