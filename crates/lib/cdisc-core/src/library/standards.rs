//! Closed identifier sets accepted by the library tools.

use std::fmt;
use std::str::FromStr;

use super::LibraryError;

/// CDISC standards that publish controlled terminology packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CtStandard {
    Sdtm,
    Adam,
    Cdash,
    DefineXml,
    Send,
    Ddf,
    Glossary,
    Mrct,
    Protocol,
    Qrs,
    QsFt,
    Tmf,
}

impl CtStandard {
    pub const ALL: [Self; 12] = [
        Self::Sdtm,
        Self::Adam,
        Self::Cdash,
        Self::DefineXml,
        Self::Send,
        Self::Ddf,
        Self::Glossary,
        Self::Mrct,
        Self::Protocol,
        Self::Qrs,
        Self::QsFt,
        Self::Tmf,
    ];

    /// Canonical uppercase form used in result records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sdtm => "SDTM",
            Self::Adam => "ADAM",
            Self::Cdash => "CDASH",
            Self::DefineXml => "DEFINE-XML",
            Self::Send => "SEND",
            Self::Ddf => "DDF",
            Self::Glossary => "GLOSSARY",
            Self::Mrct => "MRCT",
            Self::Protocol => "PROTOCOL",
            Self::Qrs => "QRS",
            Self::QsFt => "QS-FT",
            Self::Tmf => "TMF",
        }
    }

    /// Lowercase token used inside URLs, e.g. `sdtm` in `sdtmct-2025-03-25`.
    #[must_use]
    pub const fn api_token(self) -> &'static str {
        match self {
            Self::Sdtm => "sdtm",
            Self::Adam => "adam",
            Self::Cdash => "cdash",
            Self::DefineXml => "define-xml",
            Self::Send => "send",
            Self::Ddf => "ddf",
            Self::Glossary => "glossary",
            Self::Mrct => "mrct",
            Self::Protocol => "protocol",
            Self::Qrs => "qrs",
            Self::QsFt => "qs-ft",
            Self::Tmf => "tmf",
        }
    }

    /// Package name prefix for this standard's CT packages, e.g. `sdtmct-`.
    #[must_use]
    pub fn package_prefix(self) -> String {
        format!("{}ct-", self.api_token())
    }

    /// Joined list of supported values for validation error messages.
    #[must_use]
    pub fn supported_values() -> String {
        Self::ALL
            .iter()
            .map(|standard| standard.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses a package token like `sdtmct` back into the standard.
    #[must_use]
    pub fn from_package_token(token: &str) -> Option<Self> {
        let base = token.strip_suffix("ct")?;
        Self::ALL
            .iter()
            .copied()
            .find(|standard| standard.api_token() == base)
    }
}

impl fmt::Display for CtStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CtStandard {
    type Err = LibraryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let upper = value.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|standard| standard.as_str() == upper)
            .ok_or_else(|| LibraryError::InvalidStandard {
                given: value.to_string(),
            })
    }
}

/// How `get_cdisc_codelist` matches the caller's value against a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Match on the codelist submission value (e.g. `AGEU`).
    Id,
    /// Match on the codelist concept code (e.g. `C66781`).
    CodelistCode,
}

impl MatchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::CodelistCode => "CodelistCode",
        }
    }
}

impl FromStr for MatchMode {
    type Err = LibraryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "ID" => Ok(Self::Id),
            "CODELISTCODE" => Ok(Self::CodelistCode),
            _ => Err(LibraryError::InvalidMatchMode {
                given: value.to_string(),
            }),
        }
    }
}

/// Implementation guides with ordinal (dash-joined integer) versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgProduct {
    Sdtmig,
    Sendig,
    Cdashig,
}

impl IgProduct {
    /// Root document path listing the product's published versions.
    #[must_use]
    pub const fn root_path(self) -> &'static str {
        match self {
            Self::Sdtmig => "/mdr/sdtmig",
            Self::Sendig => "/mdr/sendig",
            Self::Cdashig => "/mdr/cdashig",
        }
    }

    /// `_links` key under which the version hrefs are published.
    #[must_use]
    pub const fn versions_key(self) -> &'static str {
        match self {
            Self::Sdtmig => "sdtmigVersions",
            Self::Sendig => "sendigVersions",
            Self::Cdashig => "cdashigVersions",
        }
    }

    /// Short product name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sdtmig => "SDTM-IG",
            Self::Sendig => "SEND-IG",
            Self::Cdashig => "CDASH-IG",
        }
    }
}
