//! Host classification for outbound-calling tools.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Host names that always point at local or cloud-metadata services.
const BLOCKED_HOSTNAMES: &[&str] = &[
    "localhost",
    "ip6-localhost",
    "metadata.google.internal",
    "metadata.aws.internal",
    "instance-data",
];

/// Returns `true` when `host` is a literal loopback, private, link-local, or
/// unspecified address, or a well-known local/metadata host name.
///
/// No DNS resolution happens here; names are judged literally.
#[must_use]
pub fn is_private_host(host: &str) -> bool {
    let host = host
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host)
        .trim_end_matches('.')
        .to_ascii_lowercase();

    if BLOCKED_HOSTNAMES.contains(&host.as_str()) || host.ends_with(".localhost") {
        return true;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_v4(v4),
        Ok(IpAddr::V6(v6)) => is_private_v6(v6),
        Err(_) => false,
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let octets = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // carrier-grade NAT, also used by some metadata services
        || matches!(octets, [100, 64..=127, ..])
        || octets == [192, 0, 0, 192]
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback() || ip.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DomainPattern {
    /// `example.com`: the domain itself and every subdomain.
    Domain(String),
    /// `*.example.com`: subdomains only.
    Subdomains(String),
}

/// Outbound domain allow-list. An empty list places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainAllowlist {
    patterns: Vec<DomainPattern>,
}

impl DomainAllowlist {
    /// Builds an allow-list, ignoring blank entries.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim().trim_end_matches('.').to_ascii_lowercase();
                if entry.is_empty() {
                    return None;
                }
                Some(match entry.strip_prefix("*.") {
                    Some(rest) => DomainPattern::Subdomains(rest.to_owned()),
                    None => DomainPattern::Domain(entry),
                })
            })
            .collect();
        Self { patterns }
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `host` may be contacted.
    #[must_use]
    pub fn permits(&self, host: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.patterns.iter().any(|pattern| match pattern {
            DomainPattern::Domain(domain) => host == *domain || is_subdomain(&host, domain),
            DomainPattern::Subdomains(domain) => is_subdomain(&host, domain),
        })
    }
}

fn is_subdomain(host: &str, domain: &str) -> bool {
    host.len() > domain.len() + 1
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}
