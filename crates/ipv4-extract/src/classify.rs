use std::net::Ipv4Addr;

/// What a dotted-quad token turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    /// A valid address outside every reserved range.
    Public(Ipv4Addr),
    /// A valid address inside a private, loopback, link-local or otherwise
    /// reserved range.
    Private(Ipv4Addr),
    /// Not a valid dotted quad (octet above 255, leading zero, wrong shape).
    Malformed,
}

impl Classification {
    /// The address, if this is a public one.
    #[inline]
    pub fn public(self) -> Option<Ipv4Addr> {
        match self {
            Classification::Public(ip) => Some(ip),
            _ => None,
        }
    }
}

/// Classify a raw token. Never fails: anything that does not parse is
/// [`Classification::Malformed`].
///
/// ```
/// use ipv4_extract::{classify, Classification};
///
/// assert!(matches!(classify("8.8.8.8"), Classification::Public(_)));
/// assert!(matches!(classify("192.168.1.1"), Classification::Private(_)));
/// assert_eq!(classify("999.999.999.999"), Classification::Malformed);
/// ```
#[inline]
pub fn classify(token: &str) -> Classification {
    match parse_ipv4_bytes(token.as_bytes()) {
        Some(ip) if is_reserved(ip) => Classification::Private(ip),
        Some(ip) => Classification::Public(ip),
        None => Classification::Malformed,
    }
}

/// Whether `ip` falls in a private or special-purpose range.
///
/// Covers 0.0.0.0/8, 10.0.0.0/8, 127.0.0.0/8, 169.254.0.0/16,
/// 172.16.0.0/12, 192.0.0.0/24 (bar 192.0.0.9 and 192.0.0.10, which are
/// globally reachable), the three documentation nets, 192.168.0.0/16,
/// 198.18.0.0/15 and 240.0.0.0/4 (which includes broadcast).
///
/// Shared address space (100.64.0.0/10) and multicast are *not* reserved here.
pub fn is_reserved(ip: Ipv4Addr) -> bool {
    let [a, b, c, d] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_documentation()
        || a == 0
        || (a == 192 && b == 0 && c == 0 && d != 9 && d != 10)
        || (a == 198 && (b & 0xfe) == 18)
        || a >= 240
}

/// Parse an IPv4 address from a byte slice.
///
/// Performs strict validation of dotted-quad notation (e.g., `192.168.1.1`).
/// Rejects:
/// - Octet values > 255
/// - Leading zeros (e.g., `192.168.001.1`)
/// - Anything other than exactly four non-empty groups of digits
///
/// ```
/// use ipv4_extract::parse_ipv4_bytes;
///
/// assert_eq!(parse_ipv4_bytes(b"192.168.1.1"), Some("192.168.1.1".parse().unwrap()));
/// assert_eq!(parse_ipv4_bytes(b"256.1.1.1"), None);
/// assert_eq!(parse_ipv4_bytes(b"192.168.01.1"), None);
/// ```
#[inline]
pub fn parse_ipv4_bytes(bytes: &[u8]) -> Option<Ipv4Addr> {
    if bytes.len() < 7 || bytes.len() > 15 {
        return None;
    }
    let mut octets = [0u8; 4];
    let mut idx = 0;
    let mut value = 0u16;
    let mut digits = 0;
    for &b in bytes {
        match b {
            b'.' => {
                if digits == 0 || idx == 3 {
                    return None;
                }
                octets[idx] = value as u8;
                idx += 1;
                value = 0;
                digits = 0;
            }
            b'0'..=b'9' => {
                if digits > 0 && value == 0 {
                    return None;
                }
                value = value * 10 + u16::from(b - b'0');
                if value > 255 {
                    return None;
                }
                digits += 1;
            }
            _ => return None,
        }
    }
    if idx != 3 || digits == 0 {
        return None;
    }
    octets[3] = value as u8;
    Some(Ipv4Addr::from(octets))
}
