use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};

use super::source_interface::{DirectorySource, PageRequest, Result, SearchPage};

/// A directory whose pages are scripted up front.  Each naming root answers
/// with its queued pages (or errors) in order; once a root's queue is empty
/// it answers with an empty page without a paging control.
///
/// Every request is recorded so callers can check how the pager behaved.
#[derive(Debug, Default)]
pub struct MemorySource {
    naming_contexts: Vec<String>,
    pages: HashMap<String, VecDeque<Result<SearchPage>>>,
    requests: Vec<PageRequest>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming_context(mut self, base: &str) -> Self {
        self.naming_contexts.push(base.to_string());
        self
    }

    pub fn with_page(mut self, base: &str, page: SearchPage) -> Self {
        self.queue(base).push_back(Ok(page));
        self
    }

    pub fn with_failure(mut self, base: &str, err: super::SourceError) -> Self {
        self.queue(base).push_back(Err(err));
        self
    }

    pub fn requests(&self) -> &[PageRequest] {
        &self.requests
    }

    fn queue(&mut self, base: &str) -> &mut VecDeque<Result<SearchPage>> {
        self.pages.entry(base.to_string()).or_default()
    }
}

#[async_trait]
impl DirectorySource for MemorySource {
    async fn naming_contexts(&mut self) -> Result<Vec<String>> {
        Ok(self.naming_contexts.clone())
    }

    async fn search_page(&mut self, request: &PageRequest) -> Result<SearchPage> {
        self.requests.push(request.clone());
        match self.pages.get_mut(&request.base).and_then(VecDeque::pop_front) {
            Some(answer) => answer,
            None => Ok(SearchPage::default()),
        }
    }
}
