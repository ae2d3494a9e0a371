// IPv4 CIDR prefix with containment matching

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network: base address plus mask length.
///
/// The base address is always stored with its host bits cleared, so
/// `10.1.0.5/24` and `10.1.0.0/24` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Prefix {
    network: Ipv4Addr,
    len: u8,
}

impl Ipv4Prefix {
    pub fn new(addr: Ipv4Addr, len: u8) -> Result<Self, String> {
        if len > 32 {
            return Err(format!("Invalid prefix length /{} for {}", len, addr));
        }
        let network = Ipv4Addr::from(u32::from(addr) & mask(len));
        Ok(Ipv4Prefix { network, len })
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Check whether an address falls inside this network
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = mask(self.len);
        (u32::from(self.network) & mask) == (u32::from(addr) & mask)
    }
}

fn mask(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        0xFFFFFFFF << (32 - len)
    }
}

impl FromStr for Ipv4Prefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "default" {
            return Ok(Ipv4Prefix {
                network: Ipv4Addr::UNSPECIFIED,
                len: 0,
            });
        }

        // No prefix length means a single host
        let (addr_str, len) = match s.split_once('/') {
            Some((addr, len)) => {
                let len: u8 = len
                    .parse()
                    .map_err(|_| format!("Invalid prefix length in '{}'", s))?;
                (addr, len)
            }
            None => (s, 32),
        };

        let addr: Ipv4Addr = addr_str
            .parse()
            .map_err(|_| format!("Invalid IPv4 address in '{}'", s))?;

        Ipv4Prefix::new(addr, len)
    }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_host_bits() {
        let prefix: Ipv4Prefix = "10.1.0.5/24".parse().unwrap();
        assert_eq!(prefix.prefix_len(), 24);
        assert_eq!(prefix.to_string(), "10.1.0.0/24");
        assert_eq!(prefix, "10.1.0.0/24".parse().unwrap());
    }

    #[test]
    fn test_parse_special_forms() {
        assert_eq!("default".parse::<Ipv4Prefix>().unwrap().to_string(), "0.0.0.0/0");
        assert_eq!("192.168.7.9".parse::<Ipv4Prefix>().unwrap().to_string(), "192.168.7.9/32");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("10.0.0.0/33".parse::<Ipv4Prefix>().is_err());
        assert!("10.0.0/8".parse::<Ipv4Prefix>().is_err());
        assert!("fd00::/8".parse::<Ipv4Prefix>().is_err());
        assert!("10.0.0.0/x".parse::<Ipv4Prefix>().is_err());
    }

    #[test]
    fn test_contains() {
        let net: Ipv4Prefix = "192.168.1.0/24".parse().unwrap();
        assert!(net.contains(Ipv4Addr::new(192, 168, 1, 100)));
        assert!(!net.contains(Ipv4Addr::new(192, 168, 2, 100)));

        let all: Ipv4Prefix = "0.0.0.0/0".parse().unwrap();
        assert!(all.contains(Ipv4Addr::new(8, 8, 8, 8)));

        let host: Ipv4Prefix = "10.0.0.1/32".parse().unwrap();
        assert!(host.contains(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(!host.contains(Ipv4Addr::new(10, 0, 0, 2)));
    }
}
