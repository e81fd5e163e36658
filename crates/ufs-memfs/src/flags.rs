// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Text form of flag sets for serde
//!
//! Flags are written as `NAME | NAME | 0x10`, the syntax of
//! [`bitflags::parser`]. An empty string is the empty set.

use bitflags::parser::{ParseHex, WriteHex};
use bitflags::Flags;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<B, S>(flags: &B, serializer: S) -> Result<S::Ok, S::Error>
where
    B: Flags,
    B::Bits: WriteHex,
    S: Serializer,
{
    let mut text = String::new();
    bitflags::parser::to_writer(flags, &mut text).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, B, D>(deserializer: D) -> Result<B, D::Error>
where
    B: Flags,
    B::Bits: ParseHex,
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    bitflags::parser::from_str(&text).map_err(serde::de::Error::custom)
}

/// Same as the module level functions, for `Option` fields.
pub mod option {
    use super::*;

    pub fn serialize<B, S>(flags: &Option<B>, serializer: S) -> Result<S::Ok, S::Error>
    where
        B: Flags,
        B::Bits: WriteHex,
        S: Serializer,
    {
        match flags {
            Some(flags) => super::serialize(flags, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, B, D>(deserializer: D) -> Result<Option<B>, D::Error>
    where
        B: Flags,
        B::Bits: ParseHex,
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| bitflags::parser::from_str(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
