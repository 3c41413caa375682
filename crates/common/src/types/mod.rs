mod identifiers;

pub use identifiers::*;
