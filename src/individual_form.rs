//! Individual (employee) form: schema, events, derived sections and the
//! session controller.
//!
//! [`update`] is the single place the draft changes. It takes the current
//! state and one event, applies the event, then re-evaluates only the
//! sections whose upstream field the event changed:
//!
//! - previous addresses follow `currentAddress.timeAtAddress` (edge-triggered
//!   on the 36-month threshold, so entries typed while below it survive),
//! - the communication address follows `currentAddress.roles.isCommunicationAddress`,
//! - the second nationality follows `identity.hasDualNationality`.

use crate::corporate_form::{address_schema, email_rules};
use crate::errors::{AppError, ResultExt};
use crate::formatting::{display_stored_phone, is_valid_date};
use crate::models::{
    Address, CurrentAddress, IdentityDetails, IndividualContact, IndividualRecord, Normalize,
    PreviousAddress, TaxDetails, TimeAtAddress,
};
use crate::reference_data::{ReferenceDataProvider, ReferenceKind};
use crate::submission::{FormKind, SubmissionEnvelope, SubmissionReceipt, Submitter};
use crate::validation::{
    landline_pattern, mobile_pattern, FieldValue, Rule, Schema, ValidationErrors,
};
use crate::visibility::{
    apply_communication_address, apply_previous_addresses, apply_second_nationality,
    requires_previous_addresses, Section, Visibility, MAX_PREVIOUS_ADDRESSES,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cross-field rules the individual schema can optionally enforce.
///
/// Both default to off: the UI reveals these inputs conditionally, but the
/// record schema itself does not require them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualValidationOptions {
    /// A dual-nationality record must name its second nationality.
    pub require_second_nationality: bool,
    /// A record under 36 months at its current address must list a previous address.
    pub require_address_history: bool,
}

fn required_text(label: &str) -> Vec<Rule> {
    vec![Rule::required(format!("{} is required", label))]
}

fn pick_from(reference: &dyn ReferenceDataProvider, kind: ReferenceKind, label: &str) -> Rule {
    Rule::one_of(
        reference.accepted_values(kind),
        format!("Select a {} from the list", label),
    )
}

fn time_at_address_schema() -> Schema<TimeAtAddress> {
    Schema::new()
        .field(
            "years",
            |t: &TimeAtAddress| FieldValue::from(t.years),
            vec![
                Rule::required("Years at address is required"),
                Rule::min(0.0, "Years at address cannot be negative"),
            ],
        )
        .field(
            "months",
            |t: &TimeAtAddress| FieldValue::from(t.months),
            vec![
                Rule::required("Months at address is required"),
                Rule::min(0.0, "Months must be between 0 and 11"),
                Rule::max(11.0, "Months must be between 0 and 11"),
            ],
        )
}

fn identity_schema(reference: &dyn ReferenceDataProvider) -> Schema<IdentityDetails> {
    Schema::new()
        .field(
            "pstrId",
            |i: &IdentityDetails| FieldValue::from(&i.pstr_id),
            required_text("PSTR ID"),
        )
        .field(
            "employeeNumber",
            |i: &IdentityDetails| FieldValue::from(i.employee_number),
            vec![
                Rule::required("Employee number is required"),
                Rule::min(1.0, "Employee number must be a positive number"),
            ],
        )
        .field(
            "title",
            |i: &IdentityDetails| FieldValue::from(&i.title),
            vec![
                Rule::required("Title is required"),
                pick_from(reference, ReferenceKind::Title, "title"),
            ],
        )
        .field(
            "firstName",
            |i: &IdentityDetails| FieldValue::from(&i.first_name),
            required_text("First name"),
        )
        .field(
            "surname",
            |i: &IdentityDetails| FieldValue::from(&i.surname),
            required_text("Surname"),
        )
        .field(
            "dateOfBirth",
            |i: &IdentityDetails| FieldValue::from(&i.date_of_birth),
            required_text("Date of birth"),
        )
        .check("dateOfBirth", |i: &IdentityDetails| {
            let dob = i.date_of_birth.as_str();
            (!dob.is_empty() && !is_valid_date(dob))
                .then(|| "Date of birth must be a real date written DD-MM-YYYY".to_string())
        })
        .field(
            "gender",
            |i: &IdentityDetails| FieldValue::from(&i.gender),
            vec![
                Rule::required("Gender is required"),
                pick_from(reference, ReferenceKind::Gender, "gender"),
            ],
        )
        .field(
            "nationality",
            |i: &IdentityDetails| FieldValue::from(&i.nationality),
            vec![
                Rule::required("Nationality is required"),
                pick_from(reference, ReferenceKind::Nationality, "nationality"),
            ],
        )
        .field(
            "secondNationality",
            |i: &IdentityDetails| FieldValue::from(&i.second_nationality),
            vec![pick_from(reference, ReferenceKind::Nationality, "nationality")],
        )
}

fn contact_schema(reference: &dyn ReferenceDataProvider) -> Schema<IndividualContact> {
    Schema::new()
        .field(
            "phoneNumber",
            |c: &IndividualContact| FieldValue::from(&c.phone_number),
            vec![
                Rule::required("Phone number is required"),
                Rule::pattern(landline_pattern(), "Phone number must be exactly 14 digits"),
            ],
        )
        .field(
            "mobileNumber",
            |c: &IndividualContact| FieldValue::from(&c.mobile_number),
            vec![
                Rule::required("Mobile number is required"),
                Rule::pattern(mobile_pattern(), "Mobile number must be exactly 10 digits"),
            ],
        )
        .field(
            "email",
            |c: &IndividualContact| FieldValue::from(&c.email),
            email_rules(),
        )
        .field(
            "employmentType",
            |c: &IndividualContact| FieldValue::from(&c.employment_type),
            vec![
                Rule::required("Employment type is required"),
                pick_from(reference, ReferenceKind::EmploymentType, "employment type"),
            ],
        )
        .field(
            "occupation",
            |c: &IndividualContact| FieldValue::from(&c.occupation),
            required_text("Occupation"),
        )
        .field(
            "marketingPreferences",
            |c: &IndividualContact| FieldValue::from(&c.marketing_preferences),
            vec![pick_from(
                reference,
                ReferenceKind::MarketingChannel,
                "marketing channel",
            )],
        )
}

fn current_address_schema(reference: &dyn ReferenceDataProvider) -> Schema<CurrentAddress> {
    Schema::new()
        .nested("address", |c: &CurrentAddress| &c.address, address_schema(reference))
        .nested(
            "timeAtAddress",
            |c: &CurrentAddress| &c.time_at_address,
            time_at_address_schema(),
        )
}

fn previous_address_schema(reference: &dyn ReferenceDataProvider) -> Schema<PreviousAddress> {
    Schema::new()
        .nested("address", |p: &PreviousAddress| &p.address, address_schema(reference))
        .nested(
            "timeAtAddress",
            |p: &PreviousAddress| &p.time_at_address,
            time_at_address_schema(),
        )
}

fn tax_schema(reference: &dyn ReferenceDataProvider) -> Schema<TaxDetails> {
    Schema::new().field(
        "taxCountries",
        |t: &TaxDetails| FieldValue::from(&t.tax_countries),
        vec![
            Rule::required("Select at least one country you pay tax in"),
            pick_from(reference, ReferenceKind::Country, "country"),
        ],
    )
}

/// The complete individual form schema.
pub fn individual_schema(
    reference: &dyn ReferenceDataProvider,
    options: IndividualValidationOptions,
) -> Schema<IndividualRecord> {
    let mut schema = Schema::new()
        .nested(
            "identity",
            |r: &IndividualRecord| &r.identity,
            identity_schema(reference),
        )
        .nested(
            "contact",
            |r: &IndividualRecord| &r.contact,
            contact_schema(reference),
        )
        .nested(
            "currentAddress",
            |r: &IndividualRecord| &r.current_address,
            current_address_schema(reference),
        )
        .field(
            "previousAddresses",
            |r: &IndividualRecord| FieldValue::Count(r.previous_addresses.len()),
            vec![Rule::max_items(
                MAX_PREVIOUS_ADDRESSES,
                format!("At most {} previous addresses", MAX_PREVIOUS_ADDRESSES),
            )],
        )
        .each(
            "previousAddresses",
            |r: &IndividualRecord| r.previous_addresses.as_slice(),
            previous_address_schema(reference),
        )
        .optional(
            "communicationAddress",
            |r: &IndividualRecord| r.communication_address.as_ref(),
            address_schema(reference),
        )
        .nested("tax", |r: &IndividualRecord| &r.tax, tax_schema(reference));

    if options.require_second_nationality {
        schema = schema.check("identity.secondNationality", |r: &IndividualRecord| {
            (r.identity.has_dual_nationality && r.identity.second_nationality.is_none())
                .then(|| "Second nationality is required for dual nationals".to_string())
        });
    }
    if options.require_address_history {
        schema = schema.check("previousAddresses", |r: &IndividualRecord| {
            (requires_previous_addresses(&r.current_address.time_at_address)
                && r.previous_addresses.is_empty())
            .then(|| "Add your previous addresses covering the last 3 years".to_string())
        });
    }
    schema
}

/// Normalizes a copy of `record` and validates it as a whole.
pub fn validate_individual(
    record: &IndividualRecord,
    reference: &dyn ReferenceDataProvider,
    options: IndividualValidationOptions,
) -> Result<IndividualRecord, ValidationErrors> {
    validate_with(&individual_schema(reference, options), record)
}

fn validate_with(
    schema: &Schema<IndividualRecord>,
    record: &IndividualRecord,
) -> Result<IndividualRecord, ValidationErrors> {
    let mut normalized = record.clone();
    normalized.normalize();
    schema.validate(&normalized)?;
    Ok(normalized)
}

/// A user edit on the individual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum IndividualEvent {
    Identity(IdentityDetails),
    Contact(IndividualContact),
    CurrentAddress(CurrentAddress),
    SetTimeAtAddress { years: Option<i64>, months: Option<i64> },
    SetIsCommunicationAddress { value: bool },
    SetDualNationality { value: bool },
    SetSecondNationality { value: Option<String> },
    AddPreviousAddress,
    UpdatePreviousAddress { index: usize, address: PreviousAddress },
    RemovePreviousAddress { index: usize },
    CommunicationAddress(Address),
    Tax(TaxDetails),
}

/// Draft plus the current state of every conditional section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualFormState {
    pub draft: IndividualRecord,
    pub visibility: Visibility,
}

impl IndividualFormState {
    /// State for a fresh form: default draft with every section derived from it.
    pub fn new() -> Self {
        Self::from_draft(IndividualRecord::default())
    }

    /// Derives section state from an existing draft and reconciles the draft
    /// with it (a needed communication address is allocated, extra previous
    /// addresses beyond [`MAX_PREVIOUS_ADDRESSES`] are dropped, and so on).
    pub fn from_draft(mut draft: IndividualRecord) -> Self {
        if draft.previous_addresses.len() > MAX_PREVIOUS_ADDRESSES {
            tracing::warn!(
                "Dropping {} previous addresses beyond the limit of {}",
                draft.previous_addresses.len() - MAX_PREVIOUS_ADDRESSES,
                MAX_PREVIOUS_ADDRESSES
            );
            draft.previous_addresses.truncate(MAX_PREVIOUS_ADDRESSES);
        }
        let visibility = Visibility::derive(&draft);
        apply_previous_addresses(&mut draft, visibility.previous_addresses);
        apply_communication_address(&mut draft, visibility.communication_address);
        apply_second_nationality(&mut draft, visibility.second_nationality);
        Self { draft, visibility }
    }

    pub fn can_add_previous_address(&self) -> bool {
        self.visibility.previous_addresses
            && self.draft.previous_addresses.len() < MAX_PREVIOUS_ADDRESSES
    }
}

impl Default for IndividualFormState {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies one event. Returns the new state and the sections whose
/// visibility flipped.
pub fn update(
    state: IndividualFormState,
    event: IndividualEvent,
) -> (IndividualFormState, Vec<Section>) {
    let IndividualFormState {
        mut draft,
        mut visibility,
    } = state;

    let before_time = draft.current_address.time_at_address;
    let before_communication = draft.current_address.roles.is_communication_address;
    let before_dual = draft.identity.has_dual_nationality;

    match event {
        IndividualEvent::Identity(identity) => draft.identity = identity,
        IndividualEvent::Contact(contact) => draft.contact = contact,
        IndividualEvent::CurrentAddress(current) => draft.current_address = current,
        IndividualEvent::SetTimeAtAddress { years, months } => {
            draft.current_address.time_at_address = TimeAtAddress { years, months };
        }
        IndividualEvent::SetIsCommunicationAddress { value } => {
            draft.current_address.roles.is_communication_address = value;
        }
        IndividualEvent::SetDualNationality { value } => draft.identity.has_dual_nationality = value,
        IndividualEvent::SetSecondNationality { value } => draft.identity.second_nationality = value,
        IndividualEvent::AddPreviousAddress => {
            if visibility.previous_addresses
                && draft.previous_addresses.len() < MAX_PREVIOUS_ADDRESSES
            {
                draft.previous_addresses.push(PreviousAddress::default());
            } else {
                tracing::debug!(
                    "Previous address not added ({} present, section visible: {})",
                    draft.previous_addresses.len(),
                    visibility.previous_addresses
                );
            }
        }
        IndividualEvent::UpdatePreviousAddress { index, address } => {
            match draft.previous_addresses.get_mut(index) {
                Some(slot) => *slot = address,
                None => tracing::warn!("Ignoring update of unknown previous address {}", index),
            }
        }
        IndividualEvent::RemovePreviousAddress { index } => {
            if index < draft.previous_addresses.len() {
                draft.previous_addresses.remove(index);
            } else {
                tracing::warn!("Ignoring removal of unknown previous address {}", index);
            }
        }
        IndividualEvent::CommunicationAddress(address) => {
            if visibility.communication_address {
                draft.communication_address = Some(address);
            } else {
                tracing::warn!("Ignoring communication address while the current address is used");
            }
        }
        IndividualEvent::Tax(tax) => draft.tax = tax,
    }

    let mut changed = Vec::new();
    let derived = Visibility::derive(&draft);

    if draft.current_address.time_at_address != before_time
        && derived.previous_addresses != visibility.previous_addresses
    {
        apply_previous_addresses(&mut draft, derived.previous_addresses);
        changed.push(Section::PreviousAddresses);
    }
    if draft.current_address.roles.is_communication_address != before_communication
        && derived.communication_address != visibility.communication_address
    {
        apply_communication_address(&mut draft, derived.communication_address);
        changed.push(Section::CommunicationAddress);
    }
    if draft.identity.has_dual_nationality != before_dual
        && derived.second_nationality != visibility.second_nationality
    {
        apply_second_nationality(&mut draft, derived.second_nationality);
        changed.push(Section::SecondNationality);
    }

    for section in &changed {
        let visible = derived.is_visible(*section);
        visibility.set(*section, visible);
        tracing::debug!(?section, visible, "Section visibility changed");
    }

    (IndividualFormState { draft, visibility }, changed)
}

/// One individual form session: state, compiled schema and options.
pub struct IndividualFormController {
    session_id: Uuid,
    state: IndividualFormState,
    schema: Schema<IndividualRecord>,
}

impl IndividualFormController {
    pub fn new(reference: &dyn ReferenceDataProvider, options: IndividualValidationOptions) -> Self {
        Self::with_state(reference, options, IndividualFormState::new())
    }

    pub fn with_state(
        reference: &dyn ReferenceDataProvider,
        options: IndividualValidationOptions,
        state: IndividualFormState,
    ) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!("Individual form session {} started", session_id);
        Self {
            session_id,
            state,
            schema: individual_schema(reference, options),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &IndividualFormState {
        &self.state
    }

    pub fn draft(&self) -> &IndividualRecord {
        &self.state.draft
    }

    pub fn visibility(&self) -> Visibility {
        self.state.visibility
    }

    pub fn can_add_previous_address(&self) -> bool {
        self.state.can_add_previous_address()
    }

    /// Applies an event and returns the sections whose visibility flipped.
    pub fn apply(&mut self, event: IndividualEvent) -> Vec<Section> {
        let state = std::mem::take(&mut self.state);
        let (state, changed) = update(state, event);
        self.state = state;
        changed
    }

    pub fn validate(&self) -> Result<IndividualRecord, ValidationErrors> {
        validate_with(&self.schema, &self.state.draft)
    }

    /// Contact phone number regrouped for display (`+44 7700 900123`).
    pub fn display_phone(&self) -> String {
        display_stored_phone(&self.state.draft.contact.phone_number)
    }

    /// Current error for one field path, for inline display.
    pub fn field_error(&self, path: &str) -> Option<String> {
        self.validate()
            .err()
            .and_then(|errors| errors.get(path).map(str::to_string))
    }

    /// Validates the draft and hands the normalized record to `submitter`.
    pub async fn submit<S: Submitter>(&self, submitter: &S) -> Result<SubmissionReceipt, AppError> {
        let record = self.validate().map_err(|errors| {
            tracing::warn!(
                "❌ Individual submission {} blocked: {}",
                self.session_id,
                errors
            );
            AppError::Validation(errors)
        })?;

        let envelope = SubmissionEnvelope::new(
            FormKind::Individual,
            self.session_id,
            &record.identity.pstr_id,
            &record,
        )?;

        submitter
            .submit(&envelope)
            .await
            .with_context(|| format!("Individual submission {}", self.session_id))
    }
}
