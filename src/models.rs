use crate::formatting::format_date;
use crate::reference_data::SCHEME_REGISTRATION_COUNTRY;
use serde::{Deserialize, Serialize};

// ============ Shared Shapes ============

/// A postal address as captured by both forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: Option<String>,
    pub address_line4: Option<String>,
    pub postcode: String,
    /// Country label, e.g. "United Kingdom".
    pub country: String,
}

/// Role flags for an address. Independent: any combination is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRoles {
    pub is_current_address: bool,
    pub is_permanent_address: bool,
    pub is_communication_address: bool,
}

/// How long someone has lived at an address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeAtAddress {
    pub years: Option<i64>,
    pub months: Option<i64>,
}

impl TimeAtAddress {
    pub fn new(years: i64, months: i64) -> Self {
        Self {
            years: Some(years),
            months: Some(months),
        }
    }

    /// `years * 12 + months`, an unset component counting as zero.
    /// `None` until at least one component is entered. Saturates instead of
    /// overflowing on out-of-range input.
    pub fn total_months(&self) -> Option<i64> {
        if self.years.is_none() && self.months.is_none() {
            return None;
        }
        Some(
            self.years
                .unwrap_or(0)
                .saturating_mul(12)
                .saturating_add(self.months.unwrap_or(0)),
        )
    }
}

// ============ Corporate Form ============

/// Everything captured by the corporate (scheme) form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorporateRecord {
    pub contact: CorporateContact,
    pub scheme_address: SchemeAddress,
    pub scheme: SchemeDetails,
    pub principal_employer: PrincipalEmployer,
    pub co_signatory: CoSignatory,
    pub account: AccountDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorporateContact {
    /// Scheme reference code linking individual records to this scheme.
    pub pstr_id: String,
    pub scheme_name: String,
    pub contact_name: String,
    pub contact_position: String,
    pub provider_name: String,
    pub phone_number: String,
    pub mobile_number: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemeAddress {
    /// Address type code, e.g. "REGISTERED".
    pub address_type: String,
    pub address: Address,
    pub roles: AddressRoles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemeDetails {
    pub how_many_signatories: Option<i64>,
    pub how_many_members: Option<i64>,
    pub how_many_to_sign: Option<i64>,
    pub scheme_value: Option<f64>,
    pub expected_annual_contributions: Option<f64>,
    pub expected_transactions_per_month: Option<i64>,
    pub payment_countries: Vec<String>,
    pub scheme_registration_country: String,
}

impl Default for SchemeDetails {
    fn default() -> Self {
        Self {
            how_many_signatories: None,
            how_many_members: None,
            how_many_to_sign: None,
            scheme_value: None,
            expected_annual_contributions: None,
            expected_transactions_per_month: None,
            payment_countries: Vec::new(),
            scheme_registration_country: SCHEME_REGISTRATION_COUNTRY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrincipalEmployer {
    pub company_name: String,
    pub registration_number: String,
    pub address: Address,
    /// Free-form; not checked against the calendar.
    pub incorporation_date: String,
    pub registration_date: String,
    pub trading_start_date: String,
    pub management_persons: Vec<ManagementPerson>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementPerson {
    pub first_name: String,
    pub surname: String,
    pub position: String,
}

/// The professional co-signatory (regulated firm) of the scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoSignatory {
    pub firm_name: String,
    pub contact_name: String,
    pub address: Address,
    pub phone_number: String,
    pub email: String,
    pub regulator_reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountDetails {
    /// Terms acknowledgement; must be ticked.
    pub acknowledgement: bool,
    pub account_types: Vec<String>,
    pub opening_balance: String,
    pub funds_value: String,
    pub funds_sources: Vec<String>,
    pub funds_source_details: Option<String>,
    pub funds_origin_countries: Vec<String>,
}

// ============ Individual Form ============

/// Everything captured by the individual (employee) form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndividualRecord {
    pub identity: IdentityDetails,
    pub contact: IndividualContact,
    pub current_address: CurrentAddress,
    pub previous_addresses: Vec<PreviousAddress>,
    /// Present only when the current address is not the communication address.
    pub communication_address: Option<Address>,
    pub tax: TaxDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityDetails {
    pub pstr_id: String,
    pub employee_number: Option<i64>,
    pub title: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub date_of_birth: String,
    pub gender: String,
    pub nationality: String,
    pub has_dual_nationality: bool,
    pub second_nationality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndividualContact {
    pub phone_number: String,
    pub mobile_number: String,
    pub email: String,
    pub employment_type: String,
    pub occupation: String,
    pub marketing_preferences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentAddress {
    pub address: Address,
    pub roles: AddressRoles,
    pub time_at_address: TimeAtAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviousAddress {
    pub address: Address,
    pub time_at_address: TimeAtAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxDetails {
    pub tax_countries: Vec<String>,
    pub foreign_tax_id: Option<String>,
}

// ============ Normalization ============

/// Tidies a draft before validation: trimmed text, absent-when-empty options,
/// no blank selections, canonical casing for emails and postcodes.
pub trait Normalize {
    fn normalize(&mut self);
}

fn tidy(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn tidy_opt(value: &mut Option<String>) {
    if let Some(inner) = value {
        tidy(inner);
        if inner.is_empty() {
            *value = None;
        }
    }
}

fn tidy_list(values: &mut Vec<String>) {
    values.iter_mut().for_each(tidy);
    values.retain(|v| !v.is_empty());
}

fn tidy_email(value: &mut String) {
    *value = value.trim().to_lowercase();
}

fn tidy_phone(value: &mut String) {
    value.retain(|c| !c.is_whitespace());
}

impl Normalize for Address {
    fn normalize(&mut self) {
        tidy(&mut self.address_line1);
        tidy(&mut self.address_line2);
        tidy_opt(&mut self.address_line3);
        tidy_opt(&mut self.address_line4);
        self.postcode = self.postcode.trim().to_uppercase();
        tidy(&mut self.country);
    }
}

impl Normalize for CorporateRecord {
    fn normalize(&mut self) {
        let contact = &mut self.contact;
        for field in [
            &mut contact.pstr_id,
            &mut contact.scheme_name,
            &mut contact.contact_name,
            &mut contact.contact_position,
            &mut contact.provider_name,
        ] {
            tidy(field);
        }
        tidy_phone(&mut contact.phone_number);
        tidy_phone(&mut contact.mobile_number);
        tidy_email(&mut contact.email);

        tidy(&mut self.scheme_address.address_type);
        self.scheme_address.address.normalize();

        tidy_list(&mut self.scheme.payment_countries);
        tidy(&mut self.scheme.scheme_registration_country);

        let employer = &mut self.principal_employer;
        for field in [
            &mut employer.company_name,
            &mut employer.registration_number,
            &mut employer.incorporation_date,
            &mut employer.registration_date,
            &mut employer.trading_start_date,
        ] {
            tidy(field);
        }
        employer.address.normalize();
        for person in &mut employer.management_persons {
            tidy(&mut person.first_name);
            tidy(&mut person.surname);
            tidy(&mut person.position);
        }

        let co_signatory = &mut self.co_signatory;
        tidy(&mut co_signatory.firm_name);
        tidy(&mut co_signatory.contact_name);
        tidy(&mut co_signatory.regulator_reference);
        tidy_phone(&mut co_signatory.phone_number);
        tidy_email(&mut co_signatory.email);
        co_signatory.address.normalize();

        let account = &mut self.account;
        tidy_list(&mut account.account_types);
        tidy(&mut account.opening_balance);
        tidy(&mut account.funds_value);
        tidy_list(&mut account.funds_sources);
        tidy_opt(&mut account.funds_source_details);
        tidy_list(&mut account.funds_origin_countries);
    }
}

impl Normalize for IndividualRecord {
    fn normalize(&mut self) {
        let identity = &mut self.identity;
        for field in [
            &mut identity.pstr_id,
            &mut identity.title,
            &mut identity.first_name,
            &mut identity.surname,
            &mut identity.gender,
            &mut identity.nationality,
        ] {
            tidy(field);
        }
        tidy_opt(&mut identity.middle_name);
        tidy_opt(&mut identity.second_nationality);
        identity.date_of_birth = format_date(identity.date_of_birth.trim());

        let contact = &mut self.contact;
        tidy_phone(&mut contact.phone_number);
        tidy_phone(&mut contact.mobile_number);
        tidy_email(&mut contact.email);
        tidy(&mut contact.employment_type);
        tidy(&mut contact.occupation);
        tidy_list(&mut contact.marketing_preferences);

        self.current_address.address.normalize();
        for previous in &mut self.previous_addresses {
            previous.address.normalize();
        }
        if let Some(address) = &mut self.communication_address {
            address.normalize();
        }

        tidy_list(&mut self.tax.tax_countries);
        tidy_opt(&mut self.tax.foreign_tax_id);
    }
}
