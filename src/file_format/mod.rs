pub mod dn;
pub mod flat;
pub mod tree;
pub mod value;
