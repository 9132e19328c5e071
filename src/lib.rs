#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate tracing;

pub mod abstract_source;
pub mod console;
pub mod extract;
pub mod file_format;
pub mod file_utils;
pub mod logging;
pub mod query;
