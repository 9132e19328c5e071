use async_trait::async_trait;
use ldap3::{
    controls::{Control, ControlType, PagedResults, RawControl},
    Ldap, LdapConnAsync, LdapError, Scope, SearchEntry, SearchResult,
};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use super::attribute_syntax::{type_binary_attribute, type_text_attribute};
use super::source_interface::{
    DirectorySource, ErrorDetails, ErrorLayer, PageEntry, PageRequest, Result, SearchPage,
    SourceError, SourceRecord,
};
use crate::file_format::value::SourceValue;

/// LDAP result code the server uses for filters it cannot process.
const RC_FILTER_ERROR: u32 = 87;

impl From<LdapError> for SourceError {
    fn from(err: LdapError) -> SourceError {
        match &err {
            LdapError::FilterParsing => SourceError::MalformedFilter(ErrorDetails {
                layer: ErrorLayer::BadInput,
                message: err.to_string(),
            }),
            LdapError::LdapResult { result } if result.rc == RC_FILTER_ERROR => {
                SourceError::MalformedFilter(ErrorDetails {
                    layer: ErrorLayer::BadInput,
                    message: err.to_string(),
                })
            }
            LdapError::LdapResult { .. } => SourceError::ProtocolFailure(ErrorDetails {
                layer: ErrorLayer::ProtocolLayer,
                message: err.to_string(),
            }),
            _ => SourceError::ProtocolFailure(ErrorDetails {
                layer: ErrorLayer::TransportLayer,
                message: err.to_string(),
            }),
        }
    }
}

/// How to reach and authenticate against the directory server.
#[derive(Clone, Debug, Default)]
pub struct ConnectionSettings {
    /// `ldap://host:port` or `ldaps://host:port`.
    pub url: String,
    /// Simple-bind identity; anonymous when absent.
    pub bind_dn: Option<String>,
    pub password: String,
}

pub struct LdapSource {
    ldap: Ldap,
}

impl LdapSource {
    pub async fn connect(settings: &ConnectionSettings) -> Result<LdapSource> {
        let (conn, mut ldap) = LdapConnAsync::new(&settings.url).await?;
        tokio::spawn(async move {
            if let Err(err) = conn.drive().await {
                warn!(%err, "LDAP connection closed with an error");
            }
        });

        match &settings.bind_dn {
            Some(bind_dn) => {
                debug!(bind_dn = %bind_dn, "simple bind");
                ldap.simple_bind(bind_dn, &settings.password)
                    .await?
                    .success()?;
            }
            None => debug!("anonymous bind"),
        }

        Ok(LdapSource { ldap })
    }

    pub async fn unbind(mut self) -> Result<()> {
        self.ldap.unbind().await?;
        Ok(())
    }

    fn record_from_entry(entry: SearchEntry) -> SourceRecord {
        // ldap3 hands attributes over in hash order; sort them so documents
        // are stable from run to run.
        let mut attributes: BTreeMap<String, SourceValue> = BTreeMap::new();
        for (name, values) in entry.attrs {
            let value = type_text_attribute(&name, values);
            attributes.insert(name, value);
        }
        for (name, values) in entry.bin_attrs {
            let value = type_binary_attribute(&name, values);
            attributes.insert(name, value);
        }

        SourceRecord {
            dn: entry.dn,
            attributes: attributes.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DirectorySource for LdapSource {
    async fn naming_contexts(&mut self) -> Result<Vec<String>> {
        let (entries, _) = self
            .ldap
            .search("", Scope::Base, "(objectClass=*)", vec!["namingContexts"])
            .await?
            .success()?;

        Ok(entries
            .into_iter()
            .next()
            .map(SearchEntry::construct)
            .and_then(|root_dse| root_dse.attrs.get("namingContexts").cloned())
            .unwrap_or_default())
    }

    async fn search_page(&mut self, request: &PageRequest) -> Result<SearchPage> {
        let paging = PagedResults {
            size: request.page_size,
            cookie: request.cookie.clone().unwrap_or_default(),
        };
        let SearchResult(result_entries, result) = self
            .ldap
            .with_controls(vec![RawControl::from(paging)])
            .search(
                &request.base,
                Scope::Subtree,
                &request.filter,
                request.attributes.clone(),
            )
            .await?;
        let result = result.success()?;

        let cookie = result.ctrls.iter().find_map(|ctrl| match ctrl {
            Control(Some(ControlType::PagedResults), raw) => {
                Some(raw.parse::<PagedResults>().cookie)
            }
            _ => None,
        });

        let entries: Vec<PageEntry> = result_entries
            .into_iter()
            .map(|entry| {
                if entry.is_ref() {
                    PageEntry::Referral
                } else if entry.is_intermediate() {
                    PageEntry::Intermediate
                } else {
                    PageEntry::Object(Self::record_from_entry(SearchEntry::construct(entry)))
                }
            })
            .collect();
        trace!(entries = entries.len(), has_cookie = cookie.is_some(), "ldap page");

        Ok(SearchPage { entries, cookie })
    }
}
