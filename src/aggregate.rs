//! Occurrence counting and the two ranked summary views.

use std::hash::BuildHasherDefault;
use std::net::Ipv4Addr;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use tracing::warn;

use crate::resolver::CountryInfo;

/// Occurrences per unique address, in first-occurrence order.
pub type AddressCounts = IndexMap<Ipv4Addr, usize, BuildHasherDefault<FxHasher>>;

/// Country per unique address, filled once per address.
pub type CountryMap = FxHashMap<Ipv4Addr, CountryInfo>;

/// One unique public address and how often it was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub ip: Ipv4Addr,
    pub count: usize,
    pub country_name: String,
    pub country_code: String,
}

/// Total occurrences of all addresses sharing a country code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountrySummaryEntry {
    pub country_name: String,
    pub country_code: String,
    pub count: usize,
}

/// Fold a stream of addresses (duplicates included) into per-address counts.
pub fn count_occurrences(addresses: impl IntoIterator<Item = Ipv4Addr>) -> AddressCounts {
    let mut counts = AddressCounts::default();
    for ip in addresses {
        *counts.entry(ip).or_insert(0) += 1;
    }
    counts
}

fn country_of<'a>(countries: &'a CountryMap, ip: &Ipv4Addr) -> Option<&'a CountryInfo> {
    let info = countries.get(ip);
    if info.is_none() {
        warn!(%ip, "address missing from country map");
    }
    info
}

/// One record per unique address, most frequent first.
///
/// Equal counts are ordered by address, ascending.
pub fn ip_list(counts: &AddressCounts, countries: &CountryMap) -> Vec<AddressRecord> {
    let unknown = CountryInfo::unknown();
    let mut records: Vec<AddressRecord> = counts
        .iter()
        .map(|(ip, &count)| {
            let info = country_of(countries, ip).unwrap_or(&unknown);
            AddressRecord {
                ip: *ip,
                count,
                country_name: info.name.clone(),
                country_code: info.code.clone(),
            }
        })
        .collect();
    records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ip.cmp(&b.ip)));
    records
}

/// One entry per country code, most frequent first.
///
/// The name kept for a code is the one attached to the last address (in
/// first-occurrence order) carrying that code. Equal counts are ordered by
/// code, ascending.
pub fn country_summary(counts: &AddressCounts, countries: &CountryMap) -> Vec<CountrySummaryEntry> {
    let unknown = CountryInfo::unknown();
    let mut by_code: IndexMap<&str, (&str, usize), BuildHasherDefault<FxHasher>> =
        IndexMap::default();

    for (ip, &count) in counts {
        let info = country_of(countries, ip).unwrap_or(&unknown);
        let entry = by_code.entry(info.code.as_str()).or_insert((info.name.as_str(), 0));
        if entry.0 != info.name {
            warn!(
                code = %info.code,
                previous = entry.0,
                current = %info.name,
                "inconsistent country names for one code"
            );
            entry.0 = info.name.as_str();
        }
        entry.1 += count;
    }

    let mut summary: Vec<CountrySummaryEntry> = by_code
        .into_iter()
        .map(|(code, (name, count))| CountrySummaryEntry {
            country_name: name.to_string(),
            country_code: code.to_string(),
            count,
        })
        .collect();
    summary.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.country_code.cmp(&b.country_code))
    });
    summary
}
