use tracing::{info_span, Instrument};

use crate::abstract_source::{
    DirectorySource, PageEntry, PageRequest, Result, SourceError, SourceRecord,
};
use crate::file_format::{flat::FlatCollection, value::normalize_attributes};

/// What to ask the directory for.  The defaults retrieve every object with
/// every user attribute, 1000 entries per page.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfig {
    pub page_size: i32,
    pub filter: String,
    pub attributes: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            filter: "(objectClass=*)".to_string(),
            attributes: vec!["*".to_string()],
        }
    }
}

/// How extraction of one naming root went.
#[derive(Clone, Debug, PartialEq)]
pub struct RootReport {
    pub base: String,
    pub pages: usize,
    pub objects: usize,
    /// The filter was rejected and nothing was kept for this root.
    pub abandoned: bool,
}

fn normalize_record(record: SourceRecord, into: &mut FlatCollection) {
    into.insert(record.dn, normalize_attributes(record.attributes));
}

/// Page through every object below `base`, adding them to `flat`.
///
/// A malformed filter abandons this root: nothing it produced is kept and
/// `Ok` is returned with `abandoned` set.  Any other source error is passed
/// on to the caller.
pub async fn extract_naming_context<S>(
    source: &mut S,
    base: &str,
    config: &ExtractConfig,
    flat: &mut FlatCollection,
) -> Result<RootReport>
where
    S: DirectorySource + Send + ?Sized,
{
    let span = info_span!("extract_naming_context", base, page_size = config.page_size);
    async move {
        // Entries are staged so an abandoned root leaves `flat` untouched.
        let mut staged = FlatCollection::new();
        let mut cookie: Option<Vec<u8>> = None;
        let mut pages = 0;

        loop {
            let request = PageRequest {
                base: base.to_string(),
                filter: config.filter.clone(),
                attributes: config.attributes.clone(),
                page_size: config.page_size,
                cookie: cookie.take(),
            };

            let page = match source.search_page(&request).await {
                Ok(page) => page,
                Err(SourceError::MalformedFilter(details)) => {
                    warn!(filter = %config.filter, error = %details.message, "malformed filter, skipping naming context");
                    return Ok(RootReport {
                        base: base.to_string(),
                        pages,
                        objects: 0,
                        abandoned: true,
                    });
                }
                Err(err) => return Err(err),
            };
            pages += 1;

            let next_cookie = page.next_cookie().map(<[u8]>::to_vec);
            trace!(page = pages, entries = page.entries.len(), has_cookie = next_cookie.is_some());

            for entry in page.entries {
                match entry {
                    PageEntry::Object(record) => normalize_record(record, &mut staged),
                    PageEntry::Referral | PageEntry::Intermediate => {}
                }
            }

            match next_cookie {
                Some(next) => cookie = Some(next),
                None => break,
            }
        }

        let objects = staged.len();
        flat.append(staged);
        debug!(objects, pages, "naming context extracted");

        Ok(RootReport {
            base: base.to_string(),
            pages,
            objects,
            abandoned: false,
        })
    }
    .instrument(span)
    .await
}

/// The naming roots to extract: the explicit `base` if there is one,
/// otherwise everything the directory advertises.
pub async fn discover_roots<S>(source: &mut S, base: Option<&str>) -> Result<Vec<String>>
where
    S: DirectorySource + Send + ?Sized,
{
    match base {
        Some(base) => Ok(vec![base.to_string()]),
        None => source.naming_contexts().await,
    }
}

/// Extract every root in order into `flat`.  Stops at the first fatal
/// error.
pub async fn extract_directory<S>(
    source: &mut S,
    roots: &[String],
    config: &ExtractConfig,
    flat: &mut FlatCollection,
) -> Result<Vec<RootReport>>
where
    S: DirectorySource + Send + ?Sized,
{
    let mut reports = vec![];
    for root in roots {
        reports.push(extract_naming_context(source, root, config, flat).await?);
    }
    Ok(reports)
}
