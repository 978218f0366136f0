//! Corporate (scheme) form: schema, events and session controller.

use crate::errors::{AppError, ResultExt};
use crate::formatting::display_stored_phone;
use crate::models::{
    AccountDetails, Address, CoSignatory, CorporateContact, CorporateRecord, ManagementPerson,
    Normalize, PrincipalEmployer, SchemeAddress, SchemeDetails,
};
use crate::reference_data::{ReferenceDataProvider, ReferenceKind, SCHEME_REGISTRATION_COUNTRY};
use crate::submission::{FormKind, SubmissionEnvelope, SubmissionReceipt, Submitter};
use crate::validation::{landline_pattern, FieldValue, Rule, Schema, ValidationErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest email accepted on either form.
pub const EMAIL_MAX_LENGTH: usize = 65;
/// Longest postcode accepted on either form.
pub const POSTCODE_MAX_LENGTH: usize = 8;

/// Rules shared by every address on both forms.
pub fn address_schema(reference: &dyn ReferenceDataProvider) -> Schema<Address> {
    Schema::new()
        .field(
            "addressLine1",
            |a: &Address| FieldValue::from(&a.address_line1),
            vec![Rule::required("Address line 1 is required")],
        )
        .field(
            "addressLine2",
            |a: &Address| FieldValue::from(&a.address_line2),
            vec![Rule::required("Address line 2 is required")],
        )
        .field(
            "postcode",
            |a: &Address| FieldValue::from(&a.postcode),
            vec![
                Rule::required("Postcode is required"),
                Rule::max_length(
                    POSTCODE_MAX_LENGTH,
                    format!("Postcode must be at most {} characters", POSTCODE_MAX_LENGTH),
                ),
            ],
        )
        .field(
            "country",
            |a: &Address| FieldValue::from(&a.country),
            vec![
                Rule::required("Country is required"),
                Rule::one_of(
                    reference.accepted_values(ReferenceKind::Country),
                    "Select a country from the list",
                ),
            ],
        )
}

/// Required, well-formed, and no longer than [`EMAIL_MAX_LENGTH`].
pub fn email_rules() -> Vec<Rule> {
    vec![
        Rule::required("Email is required"),
        Rule::max_length(
            EMAIL_MAX_LENGTH,
            format!("Email must be at most {} characters", EMAIL_MAX_LENGTH),
        ),
        Rule::email("Enter a valid email address"),
    ]
}

fn landline_rules(label: &str) -> Vec<Rule> {
    vec![
        Rule::required(format!("{} is required", label)),
        Rule::pattern(
            landline_pattern(),
            format!("{} must be exactly 14 digits", label),
        ),
    ]
}

fn required_text(label: &str) -> Vec<Rule> {
    vec![Rule::required(format!("{} is required", label))]
}

fn contact_schema() -> Schema<CorporateContact> {
    Schema::new()
        .field(
            "pstrId",
            |c: &CorporateContact| FieldValue::from(&c.pstr_id),
            required_text("PSTR ID"),
        )
        .field(
            "schemeName",
            |c: &CorporateContact| FieldValue::from(&c.scheme_name),
            required_text("Scheme name"),
        )
        .field(
            "contactName",
            |c: &CorporateContact| FieldValue::from(&c.contact_name),
            required_text("Contact name"),
        )
        .field(
            "contactPosition",
            |c: &CorporateContact| FieldValue::from(&c.contact_position),
            required_text("Contact position"),
        )
        .field(
            "providerName",
            |c: &CorporateContact| FieldValue::from(&c.provider_name),
            required_text("Provider name"),
        )
        .field(
            "phoneNumber",
            |c: &CorporateContact| FieldValue::from(&c.phone_number),
            landline_rules("Phone number"),
        )
        .field(
            "mobileNumber",
            |c: &CorporateContact| FieldValue::from(&c.mobile_number),
            landline_rules("Mobile number"),
        )
        .field(
            "email",
            |c: &CorporateContact| FieldValue::from(&c.email),
            email_rules(),
        )
}

fn scheme_address_schema(reference: &dyn ReferenceDataProvider) -> Schema<SchemeAddress> {
    Schema::new()
        .field(
            "addressType",
            |s: &SchemeAddress| FieldValue::from(&s.address_type),
            vec![
                Rule::required("Address type is required"),
                Rule::one_of(
                    reference.accepted_values(ReferenceKind::AddressType),
                    "Select an address type from the list",
                ),
            ],
        )
        .nested("address", |s: &SchemeAddress| &s.address, address_schema(reference))
}

fn count_rules(label: &str, minimum: i64) -> Vec<Rule> {
    if minimum > 0 {
        let required = format!("{} is required", label);
        vec![
            Rule::required(required.clone()),
            Rule::min(minimum as f64, required),
        ]
    } else {
        vec![
            Rule::required(format!("{} is required", label)),
            Rule::min(0.0, format!("{} cannot be negative", label)),
        ]
    }
}

fn scheme_schema(reference: &dyn ReferenceDataProvider) -> Schema<SchemeDetails> {
    Schema::new()
        .field(
            "howManySignatories",
            |s: &SchemeDetails| FieldValue::from(s.how_many_signatories),
            vec![Rule::min(0.0, "Number of signatories cannot be negative")],
        )
        .field(
            "howManyMembers",
            |s: &SchemeDetails| FieldValue::from(s.how_many_members),
            count_rules("Number of members", 1),
        )
        .field(
            "howManyToSign",
            |s: &SchemeDetails| FieldValue::from(s.how_many_to_sign),
            count_rules("Number of signatories required to sign", 1),
        )
        .field(
            "schemeValue",
            |s: &SchemeDetails| FieldValue::from(s.scheme_value),
            count_rules("Scheme value", 0),
        )
        .field(
            "expectedAnnualContributions",
            |s: &SchemeDetails| FieldValue::from(s.expected_annual_contributions),
            count_rules("Expected annual contributions", 0),
        )
        .field(
            "expectedTransactionsPerMonth",
            |s: &SchemeDetails| FieldValue::from(s.expected_transactions_per_month),
            count_rules("Expected transactions per month", 0),
        )
        .field(
            "paymentCountries",
            |s: &SchemeDetails| FieldValue::from(&s.payment_countries),
            vec![
                Rule::required("Select at least one payment country"),
                Rule::one_of(
                    reference.accepted_values(ReferenceKind::Country),
                    "Select payment countries from the list",
                ),
            ],
        )
        .field(
            "schemeRegistrationCountry",
            |s: &SchemeDetails| FieldValue::from(&s.scheme_registration_country),
            vec![Rule::equals(
                SCHEME_REGISTRATION_COUNTRY,
                format!("Scheme must be registered in the {}", SCHEME_REGISTRATION_COUNTRY),
            )],
        )
}

fn management_person_schema() -> Schema<ManagementPerson> {
    Schema::new()
        .field(
            "firstName",
            |p: &ManagementPerson| FieldValue::from(&p.first_name),
            required_text("First name"),
        )
        .field(
            "surname",
            |p: &ManagementPerson| FieldValue::from(&p.surname),
            required_text("Surname"),
        )
        .field(
            "position",
            |p: &ManagementPerson| FieldValue::from(&p.position),
            required_text("Position"),
        )
}

fn principal_employer_schema(reference: &dyn ReferenceDataProvider) -> Schema<PrincipalEmployer> {
    Schema::new()
        .field(
            "companyName",
            |e: &PrincipalEmployer| FieldValue::from(&e.company_name),
            required_text("Company name"),
        )
        .field(
            "registrationNumber",
            |e: &PrincipalEmployer| FieldValue::from(&e.registration_number),
            required_text("Company registration number"),
        )
        .nested("address", |e: &PrincipalEmployer| &e.address, address_schema(reference))
        .field(
            "incorporationDate",
            |e: &PrincipalEmployer| FieldValue::from(&e.incorporation_date),
            required_text("Date of incorporation"),
        )
        .field(
            "registrationDate",
            |e: &PrincipalEmployer| FieldValue::from(&e.registration_date),
            required_text("Date of registration"),
        )
        .field(
            "tradingStartDate",
            |e: &PrincipalEmployer| FieldValue::from(&e.trading_start_date),
            required_text("Trading start date"),
        )
        .field(
            "managementPersons",
            |e: &PrincipalEmployer| FieldValue::Count(e.management_persons.len()),
            vec![Rule::required("Add at least one person in management")],
        )
        .each(
            "managementPersons",
            |e: &PrincipalEmployer| e.management_persons.as_slice(),
            management_person_schema(),
        )
}

fn co_signatory_schema(reference: &dyn ReferenceDataProvider) -> Schema<CoSignatory> {
    Schema::new()
        .field(
            "firmName",
            |c: &CoSignatory| FieldValue::from(&c.firm_name),
            required_text("Co-signatory firm name"),
        )
        .field(
            "contactName",
            |c: &CoSignatory| FieldValue::from(&c.contact_name),
            required_text("Co-signatory contact name"),
        )
        .nested("address", |c: &CoSignatory| &c.address, address_schema(reference))
        .field(
            "phoneNumber",
            |c: &CoSignatory| FieldValue::from(&c.phone_number),
            landline_rules("Phone number"),
        )
        .field(
            "email",
            |c: &CoSignatory| FieldValue::from(&c.email),
            email_rules(),
        )
        .field(
            "regulatorReference",
            |c: &CoSignatory| FieldValue::from(&c.regulator_reference),
            required_text("Regulator reference"),
        )
}

fn account_schema(reference: &dyn ReferenceDataProvider) -> Schema<AccountDetails> {
    Schema::new()
        .field(
            "acknowledgement",
            |a: &AccountDetails| FieldValue::from(a.acknowledgement),
            vec![Rule::is_true("You must accept the acknowledgement")],
        )
        .field(
            "accountTypes",
            |a: &AccountDetails| FieldValue::from(&a.account_types),
            vec![
                Rule::required("Select at least one account type"),
                Rule::one_of(
                    reference.accepted_values(ReferenceKind::AccountType),
                    "Select account types from the list",
                ),
            ],
        )
        .field(
            "openingBalance",
            |a: &AccountDetails| FieldValue::from(&a.opening_balance),
            required_text("Opening balance"),
        )
        .field(
            "fundsValue",
            |a: &AccountDetails| FieldValue::from(&a.funds_value),
            required_text("Value of funds"),
        )
        .field(
            "fundsSources",
            |a: &AccountDetails| FieldValue::from(&a.funds_sources),
            vec![
                Rule::required("Select at least one source of funds"),
                Rule::one_of(
                    reference.accepted_values(ReferenceKind::FundsSource),
                    "Select sources of funds from the list",
                ),
            ],
        )
        .field(
            "fundsOriginCountries",
            |a: &AccountDetails| FieldValue::from(&a.funds_origin_countries),
            vec![
                Rule::required("Select at least one country the funds come from"),
                Rule::one_of(
                    reference.accepted_values(ReferenceKind::Country),
                    "Select countries from the list",
                ),
            ],
        )
}

/// The complete corporate form schema.
pub fn corporate_schema(reference: &dyn ReferenceDataProvider) -> Schema<CorporateRecord> {
    Schema::new()
        .nested("contact", |r: &CorporateRecord| &r.contact, contact_schema())
        .nested(
            "schemeAddress",
            |r: &CorporateRecord| &r.scheme_address,
            scheme_address_schema(reference),
        )
        .nested("scheme", |r: &CorporateRecord| &r.scheme, scheme_schema(reference))
        .nested(
            "principalEmployer",
            |r: &CorporateRecord| &r.principal_employer,
            principal_employer_schema(reference),
        )
        .nested(
            "coSignatory",
            |r: &CorporateRecord| &r.co_signatory,
            co_signatory_schema(reference),
        )
        .nested("account", |r: &CorporateRecord| &r.account, account_schema(reference))
}

/// Normalizes a copy of `record` and validates it as a whole.
pub fn validate_corporate(
    record: &CorporateRecord,
    reference: &dyn ReferenceDataProvider,
) -> Result<CorporateRecord, ValidationErrors> {
    validate_with(&corporate_schema(reference), record)
}

fn validate_with(
    schema: &Schema<CorporateRecord>,
    record: &CorporateRecord,
) -> Result<CorporateRecord, ValidationErrors> {
    let mut normalized = record.clone();
    normalized.normalize();
    schema.validate(&normalized)?;
    Ok(normalized)
}

/// A user edit on the corporate form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CorporateEvent {
    Contact(CorporateContact),
    SchemeAddress(SchemeAddress),
    Scheme(SchemeDetails),
    PrincipalEmployer(PrincipalEmployer),
    CoSignatory(CoSignatory),
    Account(AccountDetails),
    AddManagementPerson,
    UpdateManagementPerson {
        index: usize,
        person: ManagementPerson,
    },
    RemoveManagementPerson {
        index: usize,
    },
}

/// Applies one event to a draft and returns the new draft.
pub fn update(mut draft: CorporateRecord, event: CorporateEvent) -> CorporateRecord {
    match event {
        CorporateEvent::Contact(contact) => draft.contact = contact,
        CorporateEvent::SchemeAddress(address) => draft.scheme_address = address,
        CorporateEvent::Scheme(scheme) => draft.scheme = scheme,
        CorporateEvent::PrincipalEmployer(employer) => draft.principal_employer = employer,
        CorporateEvent::CoSignatory(co_signatory) => draft.co_signatory = co_signatory,
        CorporateEvent::Account(account) => draft.account = account,
        CorporateEvent::AddManagementPerson => draft
            .principal_employer
            .management_persons
            .push(ManagementPerson::default()),
        CorporateEvent::UpdateManagementPerson { index, person } => {
            match draft.principal_employer.management_persons.get_mut(index) {
                Some(slot) => *slot = person,
                None => tracing::warn!("Ignoring update of unknown management person {}", index),
            }
        }
        CorporateEvent::RemoveManagementPerson { index } => {
            let persons = &mut draft.principal_employer.management_persons;
            if index < persons.len() {
                persons.remove(index);
            } else {
                tracing::warn!("Ignoring removal of unknown management person {}", index);
            }
        }
    }
    draft
}

/// One corporate form session: the draft plus the compiled schema.
pub struct CorporateFormController {
    session_id: Uuid,
    draft: CorporateRecord,
    schema: Schema<CorporateRecord>,
}

impl CorporateFormController {
    /// Starts a session with an empty draft holding one management person.
    pub fn new(reference: &dyn ReferenceDataProvider) -> Self {
        let mut draft = CorporateRecord::default();
        draft
            .principal_employer
            .management_persons
            .push(ManagementPerson::default());
        Self::with_draft(reference, draft)
    }

    pub fn with_draft(reference: &dyn ReferenceDataProvider, draft: CorporateRecord) -> Self {
        let session_id = Uuid::new_v4();
        tracing::debug!("Corporate form session {} started", session_id);
        Self {
            session_id,
            draft,
            schema: corporate_schema(reference),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn draft(&self) -> &CorporateRecord {
        &self.draft
    }

    pub fn apply(&mut self, event: CorporateEvent) {
        let draft = std::mem::take(&mut self.draft);
        self.draft = update(draft, event);
    }

    pub fn validate(&self) -> Result<CorporateRecord, ValidationErrors> {
        validate_with(&self.schema, &self.draft)
    }

    /// Contact phone number regrouped for display (`+44 7700 900123`).
    pub fn display_phone(&self) -> String {
        display_stored_phone(&self.draft.contact.phone_number)
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
                "❌ Corporate submission {} blocked: {}",
                self.session_id,
                errors
            );
            AppError::Validation(errors)
        })?;

        let envelope = SubmissionEnvelope::new(
            FormKind::Corporate,
            self.session_id,
            &record.contact.pstr_id,
            &record,
        )?;

        submitter
            .submit(&envelope)
            .await
            .with_context(|| format!("Corporate submission {}", self.session_id))
    }
}
