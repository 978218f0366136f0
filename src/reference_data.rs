//! Static reference lists backing every enumerable form field.
//!
//! Each list is an ordered sequence of `(code, label)` pairs with unique codes.
//! Consumers only see the [`ReferenceDataProvider`] trait, so a list can be
//! extended (or served from elsewhere) without touching the form schemas.

use crate::errors::{AppError, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// The registration country every scheme must be registered in.
pub const SCHEME_REGISTRATION_COUNTRY: &str = "United Kingdom";

/// Enumerable concepts with a reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Country,
    Title,
    Gender,
    EmploymentType,
    MarketingChannel,
    Nationality,
    AddressType,
    AccountType,
    FundsSource,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 9] = [
        ReferenceKind::Country,
        ReferenceKind::Title,
        ReferenceKind::Gender,
        ReferenceKind::EmploymentType,
        ReferenceKind::MarketingChannel,
        ReferenceKind::Nationality,
        ReferenceKind::AddressType,
        ReferenceKind::AccountType,
        ReferenceKind::FundsSource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Country => "country",
            ReferenceKind::Title => "title",
            ReferenceKind::Gender => "gender",
            ReferenceKind::EmploymentType => "employment_type",
            ReferenceKind::MarketingChannel => "marketing_channel",
            ReferenceKind::Nationality => "nationality",
            ReferenceKind::AddressType => "address_type",
            ReferenceKind::AccountType => "account_type",
            ReferenceKind::FundsSource => "funds_source",
        }
    }

    /// Countries are stored in records by their label ("United Kingdom"); all
    /// other kinds by code.
    pub fn stored_as_label(self) -> bool {
        matches!(self, ReferenceKind::Country)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ReferenceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown reference kind: {}", s)))
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub code: String,
    pub label: String,
}

/// Read-only source of reference lists.
pub trait ReferenceDataProvider: Send + Sync {
    /// Ordered entries for `kind`; empty when the kind has no list.
    fn entries(&self, kind: ReferenceKind) -> &[ReferenceEntry];

    fn label(&self, kind: ReferenceKind, code: &str) -> Option<&str> {
        self.entries(kind)
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.label.as_str())
    }

    fn contains_code(&self, kind: ReferenceKind, code: &str) -> bool {
        self.entries(kind).iter().any(|e| e.code == code)
    }

    /// Values a record may hold for `kind` (labels for countries, codes otherwise).
    fn accepted_values(&self, kind: ReferenceKind) -> Vec<String> {
        self.entries(kind)
            .iter()
            .map(|e| {
                if kind.stored_as_label() {
                    e.label.clone()
                } else {
                    e.code.clone()
                }
            })
            .collect()
    }
}

/// In-process reference lists.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    lists: HashMap<ReferenceKind, Vec<ReferenceEntry>>,
}

impl ReferenceData {
    /// The built-in lists.
    pub fn builtin() -> Self {
        let mut lists = HashMap::new();
        for kind in ReferenceKind::ALL {
            let entries = builtin_entries(kind)
                .iter()
                .map(|(code, label)| ReferenceEntry {
                    code: (*code).to_string(),
                    label: (*label).to_string(),
                })
                .collect();
            lists.insert(kind, entries);
        }
        Self { lists }
    }

    /// Appends an entry to the end of a list. Codes stay unique.
    pub fn append(
        &mut self,
        kind: ReferenceKind,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<(), AppError> {
        let code = code.into();
        let list = self.lists.entry(kind).or_default();
        if list.iter().any(|e| e.code == code) {
            return Err(AppError::BadRequest(format!(
                "Duplicate {} code: {}",
                kind, code
            )));
        }
        list.push(ReferenceEntry {
            code,
            label: label.into(),
        });
        Ok(())
    }

    /// Appends every entry of a JSON overlay such as
    /// `{"country": [{"code": "XK", "label": "Kosovo"}]}`.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize, AppError> {
        let overlay: HashMap<ReferenceKind, Vec<ReferenceEntry>> = serde_json::from_str(json)
            .map_err(AppError::from)
            .context("Invalid reference data overlay")?;
        let mut added = 0;
        for (kind, entries) in overlay {
            for entry in entries {
                self.append(kind, entry.code, entry.label)?;
                added += 1;
            }
        }
        tracing::debug!("Reference data overlay appended {} entries", added);
        Ok(added)
    }
}

impl ReferenceDataProvider for ReferenceData {
    fn entries(&self, kind: ReferenceKind) -> &[ReferenceEntry] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Shared instance of [`ReferenceData::builtin`].
pub fn builtin_reference() -> &'static ReferenceData {
    static BUILTIN: OnceLock<ReferenceData> = OnceLock::new();
    BUILTIN.get_or_init(ReferenceData::builtin)
}

fn builtin_entries(kind: ReferenceKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        ReferenceKind::Country => COUNTRIES,
        ReferenceKind::Title => TITLES,
        ReferenceKind::Gender => GENDERS,
        ReferenceKind::EmploymentType => EMPLOYMENT_TYPES,
        ReferenceKind::MarketingChannel => MARKETING_CHANNELS,
        ReferenceKind::Nationality => NATIONALITIES,
        ReferenceKind::AddressType => ADDRESS_TYPES,
        ReferenceKind::AccountType => ACCOUNT_TYPES,
        ReferenceKind::FundsSource => FUNDS_SOURCES,
    }
}

const COUNTRIES: &[(&str, &str)] = &[
    ("GB", "United Kingdom"),
    ("IE", "Ireland"),
    ("IM", "Isle of Man"),
    ("JE", "Jersey"),
    ("GG", "Guernsey"),
    ("GI", "Gibraltar"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("ES", "Spain"),
    ("PT", "Portugal"),
    ("IT", "Italy"),
    ("NL", "Netherlands"),
    ("BE", "Belgium"),
    ("LU", "Luxembourg"),
    ("CH", "Switzerland"),
    ("AT", "Austria"),
    ("DK", "Denmark"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("FI", "Finland"),
    ("PL", "Poland"),
    ("GR", "Greece"),
    ("CY", "Cyprus"),
    ("MT", "Malta"),
    ("US", "United States"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("NZ", "New Zealand"),
    ("ZA", "South Africa"),
    ("IN", "India"),
    ("PK", "Pakistan"),
    ("HK", "Hong Kong"),
    ("SG", "Singapore"),
    ("JP", "Japan"),
    ("CN", "China"),
    ("AE", "United Arab Emirates"),
    ("SA", "Saudi Arabia"),
    ("BR", "Brazil"),
    ("NG", "Nigeria"),
    ("KE", "Kenya"),
];

const TITLES: &[(&str, &str)] = &[
    ("MR", "Mr"),
    ("MRS", "Mrs"),
    ("MISS", "Miss"),
    ("MS", "Ms"),
    ("MX", "Mx"),
    ("DR", "Dr"),
    ("PROF", "Prof"),
    ("REV", "Rev"),
];

const GENDERS: &[(&str, &str)] = &[
    ("M", "Male"),
    ("F", "Female"),
    ("X", "Other"),
    ("U", "Prefer not to say"),
];

const EMPLOYMENT_TYPES: &[(&str, &str)] = &[
    ("FULL_TIME", "Employed (full time)"),
    ("PART_TIME", "Employed (part time)"),
    ("SELF_EMPLOYED", "Self-employed"),
    ("DIRECTOR", "Company director"),
    ("CONTRACTOR", "Contractor"),
    ("RETIRED", "Retired"),
    ("UNEMPLOYED", "Not employed"),
];

const MARKETING_CHANNELS: &[(&str, &str)] = &[
    ("EMAIL", "Email"),
    ("PHONE", "Telephone"),
    ("SMS", "Text message"),
    ("POST", "Post"),
];

const NATIONALITIES: &[(&str, &str)] = &[
    ("GB", "British"),
    ("IE", "Irish"),
    ("FR", "French"),
    ("DE", "German"),
    ("ES", "Spanish"),
    ("PT", "Portuguese"),
    ("IT", "Italian"),
    ("NL", "Dutch"),
    ("BE", "Belgian"),
    ("PL", "Polish"),
    ("GR", "Greek"),
    ("SE", "Swedish"),
    ("DK", "Danish"),
    ("CH", "Swiss"),
    ("US", "American"),
    ("CA", "Canadian"),
    ("AU", "Australian"),
    ("NZ", "New Zealander"),
    ("ZA", "South African"),
    ("IN", "Indian"),
    ("PK", "Pakistani"),
    ("CN", "Chinese"),
    ("JP", "Japanese"),
    ("NG", "Nigerian"),
];

const ADDRESS_TYPES: &[(&str, &str)] = &[
    ("REGISTERED", "Registered office"),
    ("TRADING", "Trading address"),
    ("CORRESPONDENCE", "Correspondence address"),
    ("RESIDENTIAL", "Residential address"),
];

const ACCOUNT_TYPES: &[(&str, &str)] = &[
    ("BANK", "Scheme bank account"),
    ("DEPOSIT", "Fixed term deposit"),
    ("INVESTMENT", "Investment account"),
];

const FUNDS_SOURCES: &[(&str, &str)] = &[
    ("EMPLOYER", "Employer contributions"),
    ("MEMBER", "Member contributions"),
    ("TRANSFER", "Pension transfer"),
    ("PROPERTY", "Property sale"),
    ("INVESTMENTS", "Investment proceeds"),
    ("OTHER", "Other"),
];
