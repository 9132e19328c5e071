pub mod attribute_syntax;
mod ldap_source;
pub mod memory_source;
mod source_interface;

pub use ldap_source::{ConnectionSettings, LdapSource};
pub use memory_source::MemorySource;
pub use source_interface::{
    DirectorySource, ErrorDetails, ErrorLayer, PageEntry, PageRequest, Result, SearchPage,
    SourceError, SourceRecord,
};
