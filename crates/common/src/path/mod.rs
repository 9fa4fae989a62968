// Path grammar and reference parsing.

pub mod grammar;
pub mod reference;

pub use grammar::{classify, depth, normalize};
pub use reference::Reference;
