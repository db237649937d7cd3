//! DNS security posture check: DNSSEC, CAA, SPF and DKIM

use crate::error::{Result, SentinelError};
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioResolver;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimRecord {
    pub selector: String,
    pub record: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsSecurityFinding {
    pub domain: String,
    pub dnssec: bool,
    pub caa_records: Vec<String>,
    pub spf_record: Option<String>,
    pub dkim_records: Vec<DkimRecord>,
}

fn txt_record_string(txt: &hickory_resolver::proto::rr::rdata::TXT) -> String {
    txt.iter()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("")
}

async fn has_ds_record(resolver: &TokioResolver, domain: &str) -> bool {
    match resolver.lookup(domain, RecordType::DS).await {
        Ok(lookup) => lookup.iter().next().is_some(),
        Err(e) => {
            debug!(domain, error = %e, "DS lookup failed");
            false
        }
    }
}

async fn caa_records(resolver: &TokioResolver, domain: &str) -> Vec<String> {
    match resolver.lookup(domain, RecordType::CAA).await {
        Ok(lookup) => lookup.iter().map(|r| r.to_string()).collect(),
        Err(e) => {
            debug!(domain, error = %e, "CAA lookup failed");
            Vec::new()
        }
    }
}

async fn spf_record(resolver: &TokioResolver, domain: &str) -> Option<String> {
    match resolver.txt_lookup(domain).await {
        Ok(lookup) => lookup
            .iter()
            .map(txt_record_string)
            .find(|txt| txt.starts_with("v=spf1")),
        Err(e) => {
            debug!(domain, error = %e, "TXT lookup failed");
            None
        }
    }
}

async fn dkim_records(
    resolver: &TokioResolver,
    domain: &str,
    selectors: &[String],
) -> Vec<DkimRecord> {
    let mut found = Vec::new();
    for selector in selectors {
        let name = format!("{selector}._domainkey.{domain}");
        match resolver.txt_lookup(name.clone()).await {
            Ok(lookup) => {
                if let Some(record) = lookup.iter().map(|txt| txt_record_string(txt)).next() {
                    found.push(DkimRecord {
                        selector: selector.clone(),
                        record,
                    });
                }
            }
            Err(e) => debug!(name = %name, error = %e, "DKIM lookup failed"),
        }
    }
    found
}

/// Checks DNSSEC delegation, CAA records and email authentication records
pub struct DnsSecurityCheck;

#[async_trait]
impl super::Check for DnsSecurityCheck {
    fn id(&self) -> &'static str {
        "dnsSecurity"
    }

    fn description(&self) -> &'static str {
        "DNSSEC, CAA, SPF and DKIM records"
    }

    async fn run(
        &self,
        _fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let domain = target.host().to_string();
        let resolver = TokioResolver::builder(TokioConnectionProvider::default())
            .map_err(|e| SentinelError::Dns(format!("failed to create resolver: {e}")))?
            .build();

        // Each lookup fails independently; a missing record type never
        // brings down the whole check.
        let dnssec = has_ds_record(&resolver, &domain).await;
        let caa = caa_records(&resolver, &domain).await;
        let spf = spf_record(&resolver, &domain).await;
        let dkim = dkim_records(&resolver, &domain, &config.heuristics.dkim_selectors).await;

        Ok(super::Finding::DnsSecurity(DnsSecurityFinding {
            domain,
            dnssec,
            caa_records: caa,
            spf_record: spf,
            dkim_records: dkim,
        }))
    }
}
