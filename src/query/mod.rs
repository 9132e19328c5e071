pub mod path_store;
pub mod search;

pub use path_store::{enumerate_paths, resolve};
pub use search::{search_by_name, search_by_value, SearchResult};
