use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use geoipsum::{
    AnalysisResult, Analyzer, CountryDatabase, CountryInfo, CountryRecord, CountryResolver,
    DatabaseConfig, Error, Locale, Resolution,
};

// In-memory stand-in for a GeoLite2-Country file
#[derive(Debug, Default)]
struct MemoryDatabase {
    records: HashMap<Ipv4Addr, CountryRecord>,
    lookups: Arc<AtomicUsize>,
}

impl MemoryDatabase {
    fn with(mut self, ip: &str, code: &str, name: &str) -> Self {
        self.records
            .insert(ip.parse().unwrap(), CountryRecord::new(code, name));
        self
    }
}

impl CountryDatabase for MemoryDatabase {
    fn name(&self) -> &str {
        "memory"
    }

    fn country(&self, ip: Ipv4Addr) -> geoipsum::Result<Option<CountryRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.get(&ip).cloned())
    }
}

fn test_database() -> MemoryDatabase {
    MemoryDatabase::default()
        .with("8.8.8.8", "US", "United States")
        .with("8.8.4.4", "US", "United States")
        .with("1.1.1.1", "AU", "Australia")
        .with("81.2.69.142", "GB", "United Kingdom")
        .with("89.160.20.112", "SE", "Sweden")
        .with("175.16.199.0", "CN", "China")
}

fn create_test_analyzer() -> Analyzer {
    Analyzer::new(CountryResolver::new(test_database())).expect("Failed to build analyzer")
}

fn analyze(text: &str) -> AnalysisResult {
    create_test_analyzer()
        .analyze(text)
        .expect("analysis should succeed")
}

fn assert_invariants(result: &AnalysisResult) {
    let summary = &result.summary;
    assert_eq!(summary.unique_ips_found, result.ip_list.len());
    assert_eq!(
        summary.total_ips_found,
        result.ip_list.iter().map(|r| r.count).sum::<usize>()
    );
    assert_eq!(
        summary.total_ips_found,
        result.country_summary.iter().map(|c| c.count).sum::<usize>()
    );
    assert!(result.ip_list.windows(2).all(|w| w[0].count >= w[1].count));
    assert!(result
        .country_summary
        .windows(2)
        .all(|w| w[0].count >= w[1].count));
}

#[test]
fn single_line_with_repeats_and_private() {
    let result = analyze("8.8.8.8 requested twice 8.8.8.8 and 10.0.0.5 once");

    assert_eq!(result.summary.total_lines, 1);
    assert_eq!(result.summary.total_ips_found, 2);
    assert_eq!(result.summary.unique_ips_found, 1);

    assert_eq!(result.ip_list.len(), 1);
    let record = &result.ip_list[0];
    assert_eq!(record.ip, Ipv4Addr::new(8, 8, 8, 8));
    assert_eq!(record.count, 2);
    assert_eq!(record.country_code, "US");
    assert_eq!(record.country_name, "United States");

    assert_eq!(result.country_summary.len(), 1);
    assert_eq!(result.country_summary[0].country_code, "US");
    assert_eq!(result.country_summary[0].count, 2);
    assert_invariants(&result);
}

#[test]
fn apache_style_log() {
    let log = r#"
81.2.69.142 - - [09/Nov/2023:15:43:52 +0000] "GET /products?beacon=89.160.20.112 HTTP/1.1" 200 2048
175.16.199.0 - - [25/May/2023:11:47:17 +0000] "POST /about HTTP/1.1" 200 2048
81.2.69.142 - - [25/May/2023:11:47:18 +0000] "GET / HTTP/1.1" 304 0
192.168.1.20 - - [25/May/2023:11:47:19 +0000] "GET /health HTTP/1.1" 200 2
"#
    .trim_start_matches('\n');

    let result = analyze(log);
    assert_eq!(result.summary.total_lines, 4);
    assert_eq!(result.summary.total_ips_found, 4);
    assert_eq!(result.summary.unique_ips_found, 3);

    let ips: Vec<String> = result.ip_list.iter().map(|r| r.ip.to_string()).collect();
    assert_eq!(ips, ["81.2.69.142", "89.160.20.112", "175.16.199.0"]);

    let codes: Vec<&str> = result
        .country_summary
        .iter()
        .map(|c| c.country_code.as_str())
        .collect();
    assert_eq!(codes, ["GB", "CN", "SE"]);
    assert_invariants(&result);
}

#[test]
fn countries_merge_addresses() {
    let result = analyze("8.8.8.8 8.8.4.4 8.8.4.4 1.1.1.1\n1.1.1.1");

    assert_eq!(result.ip_list[0].ip, Ipv4Addr::new(1, 1, 1, 1));
    assert_eq!(result.ip_list[1].ip, Ipv4Addr::new(8, 8, 4, 4));
    assert_eq!(result.ip_list[2].ip, Ipv4Addr::new(8, 8, 8, 8));

    assert_eq!(result.country_summary.len(), 2);
    assert_eq!(result.country_summary[0].country_code, "US");
    assert_eq!(result.country_summary[0].count, 3);
    assert_eq!(result.country_summary[1].country_code, "AU");
    assert_eq!(result.country_summary[1].count, 2);
    assert_invariants(&result);
}

#[test]
fn unknown_addresses_get_sentinel() {
    let result = analyze("2.2.2.2 and 3.3.3.3 and 2.2.2.2");

    assert_eq!(result.ip_list.len(), 2);
    assert!(result
        .ip_list
        .iter()
        .all(|r| r.country_name == "Unknown" && r.country_code == "N/A"));
    assert_eq!(result.country_summary.len(), 1);
    assert_eq!(result.country_summary[0].country_code, "N/A");
    assert_eq!(result.country_summary[0].count, 3);
    assert_invariants(&result);
}

#[test]
fn private_and_reserved_excluded() {
    let log = "10.0.0.1 172.16.5.4 192.168.0.1 127.0.0.1 169.254.1.1 0.0.0.0 \
               192.0.2.1 198.51.100.7 203.0.113.9 198.18.0.1 240.0.0.1 255.255.255.255";
    let result = analyze(log);

    assert_eq!(result.summary.total_lines, 1);
    assert_eq!(result.summary.total_ips_found, 0);
    assert_eq!(result.summary.unique_ips_found, 0);
    assert!(result.ip_list.is_empty());
    assert!(result.country_summary.is_empty());
}

#[test]
fn shared_and_multicast_are_public() {
    let result = analyze("100.64.0.1 224.0.0.1");
    assert_eq!(result.summary.total_ips_found, 2);
    assert_invariants(&result);
}

#[test]
fn malformed_tokens_never_resolved() {
    let database = test_database();
    let lookups = Arc::clone(&database.lookups);
    let analyzer = Analyzer::new(CountryResolver::new(database)).unwrap();

    let result = analyzer
        .analyze("999.1.1.1 300.300.300.300 01.2.3.4 8.8.8.8")
        .unwrap();

    assert_eq!(result.summary.total_ips_found, 1);
    assert_eq!(result.ip_list[0].ip, Ipv4Addr::new(8, 8, 8, 8));
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn each_unique_address_resolved_once() {
    let database = test_database();
    let lookups = Arc::clone(&database.lookups);
    let analyzer = Analyzer::new(CountryResolver::new(database)).unwrap();

    let log = "8.8.8.8\n".repeat(500) + &"1.1.1.1\n".repeat(250);
    let result = analyzer.analyze(&log).unwrap();

    assert_eq!(result.summary.total_lines, 750);
    assert_eq!(result.summary.total_ips_found, 750);
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[test]
fn no_addresses_is_an_empty_result() {
    let result = analyze("nothing to see here\njust words\n");

    assert_eq!(result.summary.total_lines, 2);
    assert_eq!(result.summary.total_ips_found, 0);
    assert!(result.ip_list.is_empty());
    assert!(matches!(result.ensure_found(), Err(Error::NoAddressesFound)));
}

#[test]
fn analysis_is_idempotent() {
    let analyzer = create_test_analyzer();
    let log = "8.8.8.8 1.1.1.1 81.2.69.142 1.1.1.1\n8.8.8.8 5.5.5.5";

    let first = analyzer.analyze(log).unwrap();
    let second = analyzer.analyze(log).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn unavailable_resolver_fails_analysis() {
    let analyzer = Analyzer::new(CountryResolver::unavailable("no database here")).unwrap();

    let err = analyzer.analyze("8.8.8.8").unwrap_err();
    assert!(matches!(err, Error::ResolverUnavailable { .. }));
    assert_eq!(err.to_string(), "no database here");

    assert_eq!(
        analyzer.resolver().resolve(Ipv4Addr::new(8, 8, 8, 8)),
        Resolution::Unavailable
    );
    assert_eq!(
        analyzer.resolver().resolve_str("8.8.8.8").country(),
        CountryInfo::unknown()
    );
}

#[test]
fn shared_across_threads() {
    let analyzer = Arc::new(create_test_analyzer());
    let expected = analyzer.analyze("8.8.8.8 1.1.1.1 8.8.8.8").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || analyzer.analyze("8.8.8.8 1.1.1.1 8.8.8.8").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn maxmind_fixture_pipeline() {
    let config = DatabaseConfig {
        directory: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/maxmind").into()),
        locale: Locale::Japanese,
        ..Default::default()
    };
    let resolver = CountryResolver::open(&config);
    assert!(resolver.is_available());
    let analyzer = Analyzer::new(resolver).unwrap();

    let result = analyzer
        .analyze("175.16.199.0 8.8.8.8\n8.8.8.8 1.1.1.1\x0c10.0.0.1")
        .unwrap();
    assert_eq!(result.summary.total_lines, 3);
    assert_eq!(result.summary.total_ips_found, 4);
    assert_eq!(result.ip_list[0].country_name, "アメリカ合衆国");
    assert_eq!(result.ip_list[0].count, 2);

    let codes: Vec<&str> = result
        .country_summary
        .iter()
        .map(|c| c.country_code.as_str())
        .collect();
    assert_eq!(codes, ["US", "CN", "N/A"]);
    assert_invariants(&result);
}
