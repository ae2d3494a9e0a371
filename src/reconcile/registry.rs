// Subnet registry - declared subnets as typed prefixes

use crate::config::SubnetMeta;
use crate::error::{AppError, AppResult};
use crate::routes::Ipv4Prefix;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq)]
pub struct SubnetEntry {
    pub prefix: Ipv4Prefix,
    pub meta: SubnetMeta,
}

impl SubnetEntry {
    /// The subnet's `gw` metadata as an address
    pub fn gateway(&self) -> AppResult<Ipv4Addr> {
        let gw = self
            .meta
            .gw
            .as_deref()
            .ok_or_else(|| AppError::Config(format!("subnet {} has no \"gw\" value", self.prefix)))?;

        gw.trim().parse().map_err(|_| {
            AppError::Config(format!("subnet {} has an invalid \"gw\" value: {}", self.prefix, gw))
        })
    }
}

/// Declared subnets in declaration order, unique by prefix
#[derive(Debug, Clone)]
pub struct SubnetRegistry {
    entries: Vec<SubnetEntry>,
}

impl SubnetRegistry {
    /// Build the registry from (prefix string, metadata) declarations.
    ///
    /// Declarations that normalize to the same prefix collapse into one entry:
    /// the first keeps its position, the last one's metadata wins.
    pub fn from_declarations(declarations: &[(String, SubnetMeta)]) -> AppResult<Self> {
        if declarations.is_empty() {
            return Err(AppError::Config("\"subnets\" in conf file is empty".to_string()));
        }

        let mut entries: Vec<SubnetEntry> = Vec::with_capacity(declarations.len());

        for (declared, meta) in declarations {
            let prefix: Ipv4Prefix = declared
                .parse()
                .map_err(|e| AppError::Config(format!("bad subnet {:?}: {}", declared, e)))?;

            match entries.iter_mut().find(|entry| entry.prefix == prefix) {
                Some(existing) => {
                    tracing::warn!("subnet {} declared more than once as {}", prefix, declared);
                    existing.meta = meta.clone();
                }
                None => entries.push(SubnetEntry {
                    prefix,
                    meta: meta.clone(),
                }),
            }
        }

        Ok(SubnetRegistry { entries })
    }

    pub fn entries(&self) -> &[SubnetEntry] {
        &self.entries
    }
}

#[cfg(test)]
pub(crate) fn declare(items: &[(&str, Option<&str>)]) -> Vec<(String, SubnetMeta)> {
    items
        .iter()
        .map(|(prefix, gw)| {
            (
                prefix.to_string(),
                SubnetMeta {
                    gw: gw.map(String::from),
                    ..Default::default()
                },
            )
        })
        .collect()
}
