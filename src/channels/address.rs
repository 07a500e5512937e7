//! Address formatting — turns channel-specific address shapes into display strings.

use serde::{Deserialize, Serialize};

/// One recipient as a notifiable routes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    /// A bare address: email, phone number, webhook, chat channel.
    Address(String),
    /// An `[email, name]` pair.
    Named { address: String, name: String },
}

impl Recipient {
    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            address: address.into(),
            name: name.into(),
        }
    }

    /// `Name <address>` when a name is present, else the address unchanged.
    pub fn display(&self) -> String {
        match self {
            Self::Address(address) => address.clone(),
            Self::Named { address, name } if name.is_empty() => address.clone(),
            Self::Named { address, name } => format!("{name} <{address}>"),
        }
    }
}

impl From<&str> for Recipient {
    fn from(address: &str) -> Self {
        Self::Address(address.to_string())
    }
}

impl From<String> for Recipient {
    fn from(address: String) -> Self {
        Self::Address(address)
    }
}

/// What a notifiable returns when asked to route itself for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Route {
    One(Recipient),
    Many(Vec<Recipient>),
}

impl From<Recipient> for Route {
    fn from(recipient: Recipient) -> Self {
        Self::One(recipient)
    }
}

impl From<&str> for Route {
    fn from(address: &str) -> Self {
        Self::One(address.into())
    }
}

impl From<String> for Route {
    fn from(address: String) -> Self {
        Self::One(address.into())
    }
}

impl From<Vec<Recipient>> for Route {
    fn from(recipients: Vec<Recipient>) -> Self {
        Self::Many(recipients)
    }
}

/// Format the addresses of a sent message.
///
/// Input pairs are `(email, display name)` in header order. A repeated email
/// keeps its first position and takes the later name. Returns `None` when
/// there are no addresses.
pub fn format_message_addresses<'a, I>(addresses: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut entries: Vec<(&str, &str)> = Vec::new();
    for (email, name) in addresses {
        match entries.iter_mut().find(|(existing, _)| *existing == email) {
            Some(entry) => entry.1 = name,
            None => entries.push((email, name)),
        }
    }

    if entries.is_empty() {
        return None;
    }

    Some(
        entries
            .into_iter()
            .map(|(email, name)| {
                if name.is_empty() {
                    email.to_string()
                } else {
                    format!("{name} <{email}>")
                }
            })
            .collect(),
    )
}

/// Format a notifiable's route into a list of display strings.
///
/// A single recipient becomes a one-element list. Returns `None` for an
/// absent route or an empty list.
pub fn format_notification_addresses(route: Option<&Route>) -> Option<Vec<String>> {
    let formatted: Vec<String> = match route? {
        Route::One(recipient) => vec![recipient.display()],
        Route::Many(recipients) => recipients.iter().map(Recipient::display).collect(),
    };

    if formatted.is_empty() {
        None
    } else {
        Some(formatted)
    }
}

/// Collect `(email, name)` pairs from a parsed address header.
///
/// Group syntax is flattened; entries without an email are skipped.
pub fn message_address_pairs<'a>(
    addr: Option<&'a mail_parser::Address<'_>>,
) -> Vec<(&'a str, &'a str)> {
    let Some(addr) = addr else {
        return Vec::new();
    };
    match addr {
        mail_parser::Address::List(addrs) => addrs.iter().filter_map(addr_pair).collect(),
        mail_parser::Address::Group(groups) => groups
            .iter()
            .flat_map(|g| g.addresses.iter().filter_map(addr_pair))
            .collect(),
    }
}

fn addr_pair<'a>(addr: &'a mail_parser::Addr<'_>) -> Option<(&'a str, &'a str)> {
    let email = addr.address.as_deref()?;
    Some((email, addr.name.as_deref().unwrap_or("")))
}
