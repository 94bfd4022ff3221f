//! Email address value types.
//!
//! Addresses appear in the source document as RFC 5322 strings, either
//! `Name <user@example.com>` or a bare `user@example.com`. The addr-spec
//! part is validated with the `email_address` crate at parse time.

use std::fmt;
use std::str::FromStr;

use email_address::EmailAddress;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::error::MailtreeError;

/// A named email address.
///
/// An address is considered empty when its `address` part is empty,
/// regardless of the display name. Empty addresses are the "unset"
/// state used by the inheritance merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Display name, may be empty.
    pub name: String,
    /// The addr-spec, e.g. `user@example.com`.
    pub address: String,
}

impl Address {
    /// Create an address from a name and an addr-spec.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Check whether the address is unset.
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}>", self.address)
        } else {
            write!(f, "\"{}\" <{}>", self.name, self.address)
        }
    }
}

impl FromStr for Address {
    type Err = MailtreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, spec) = match (s.rfind('<'), s.ends_with('>')) {
            (Some(open), true) => {
                let name = s[..open].trim();
                // Strip optional surrounding quotes from the display name.
                let name = name
                    .strip_prefix('"')
                    .and_then(|n| n.strip_suffix('"'))
                    .unwrap_or(name);
                (name, s[open + 1..s.len() - 1].trim())
            }
            (Some(_), false) | (None, true) => {
                return Err(MailtreeError::Address(s.to_string()));
            }
            (None, false) => ("", s),
        };

        EmailAddress::from_str(spec).map_err(|_| MailtreeError::Address(s.to_string()))?;

        Ok(Address::new(name, spec))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// An ordered list of addresses.
///
/// Order is significant: the inheritance merge concatenates lists and
/// dispatch preserves the concatenated order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AddressList(pub Vec<Address>);

impl AddressList {
    /// Check whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the addresses.
    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.0.iter()
    }

    /// Concatenate: own entries followed by the other list's entries.
    pub fn concat(&self, other: &AddressList) -> AddressList {
        AddressList(self.0.iter().chain(other.0.iter()).cloned().collect())
    }
}

impl From<Vec<Address>> for AddressList {
    fn from(addresses: Vec<Address>) -> Self {
        AddressList(addresses)
    }
}

impl<'a> IntoIterator for &'a AddressList {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(Address::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_address() {
        let addr: Address = "user@example.com".parse().unwrap();
        assert_eq!(addr.name, "");
        assert_eq!(addr.address, "user@example.com");
    }

    #[test]
    fn test_parse_named_address() {
        let addr: Address = "Taro Yamada <taro@example.com>".parse().unwrap();
        assert_eq!(addr.name, "Taro Yamada");
        assert_eq!(addr.address, "taro@example.com");
    }

    #[test]
    fn test_parse_quoted_name() {
        let addr: Address = "\"Yamada, Taro\" <taro@example.com>".parse().unwrap();
        assert_eq!(addr.name, "Yamada, Taro");
        assert_eq!(addr.address, "taro@example.com");
    }

    #[test]
    fn test_parse_angle_only() {
        let addr: Address = "<taro@example.com>".parse().unwrap();
        assert_eq!(addr.name, "");
        assert_eq!(addr.address, "taro@example.com");
    }

    #[test]
    fn test_parse_invalid_spec() {
        assert!("not an address".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
        assert!("Broken <no-at-sign>".parse::<Address>().is_err());
    }

    #[test]
    fn test_parse_unbalanced_brackets() {
        assert!("Taro <taro@example.com".parse::<Address>().is_err());
        assert!("taro@example.com>".parse::<Address>().is_err());
    }

    #[test]
    fn test_display_with_name() {
        let addr = Address::new("Taro", "taro@example.com");
        assert_eq!(addr.to_string(), "\"Taro\" <taro@example.com>");
    }

    #[test]
    fn test_display_without_name() {
        let addr = Address::new("", "taro@example.com");
        assert_eq!(addr.to_string(), "<taro@example.com>");
    }

    #[test]
    fn test_is_empty() {
        assert!(Address::default().is_empty());
        assert!(Address::new("Name only", "").is_empty());
        assert!(!Address::new("", "a@b.example").is_empty());
    }

    #[test]
    fn test_list_display() {
        let list = AddressList(vec![
            Address::new("A", "a@example.com"),
            Address::new("", "b@example.com"),
        ]);
        assert_eq!(list.to_string(), "\"A\" <a@example.com>, <b@example.com>");
    }

    #[test]
    fn test_list_concat_order() {
        let own = AddressList(vec![Address::new("", "child@example.com")]);
        let inherited = AddressList(vec![Address::new("", "parent@example.com")]);
        let merged = own.concat(&inherited);
        assert_eq!(merged.0[0].address, "child@example.com");
        assert_eq!(merged.0[1].address, "parent@example.com");
    }

    #[test]
    fn test_yaml_round_trip() {
        let addr: Address = serde_yaml::from_str("Taro <taro@example.com>").unwrap();
        assert_eq!(addr.name, "Taro");
        let out = serde_yaml::to_string(&addr).unwrap();
        assert!(out.contains("taro@example.com"));
    }
}
