// outline-common: shared types and the path grammar for the outline workspace.

pub mod nested;
pub mod path;
pub mod types;
