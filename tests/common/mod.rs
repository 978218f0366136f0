//! Shared fixtures: complete, valid records for both forms.
#![allow(dead_code)]

use ssas_onboarding::models::*;

pub fn uk_address(line1: &str, postcode: &str) -> Address {
    Address {
        address_line1: line1.to_string(),
        address_line2: "Westminster".to_string(),
        address_line3: None,
        address_line4: None,
        postcode: postcode.to_string(),
        country: "United Kingdom".to_string(),
    }
}

pub fn valid_corporate() -> CorporateRecord {
    CorporateRecord {
        contact: CorporateContact {
            pstr_id: "00123456RA".to_string(),
            scheme_name: "Acme Directors SSAS".to_string(),
            contact_name: "Jane Smith".to_string(),
            contact_position: "Trustee".to_string(),
            provider_name: "Northgate Pensions".to_string(),
            phone_number: "00442071234567".to_string(),
            mobile_number: "00447700900123".to_string(),
            email: "jane.smith@acme.co.uk".to_string(),
        },
        scheme_address: SchemeAddress {
            address_type: "REGISTERED".to_string(),
            address: uk_address("1 High Street", "SW1A 1AA"),
            roles: AddressRoles {
                is_current_address: true,
                is_permanent_address: false,
                is_communication_address: false,
            },
        },
        scheme: SchemeDetails {
            how_many_signatories: Some(2),
            how_many_members: Some(3),
            how_many_to_sign: Some(2),
            scheme_value: Some(250_000.0),
            expected_annual_contributions: Some(40_000.0),
            expected_transactions_per_month: Some(4),
            payment_countries: vec!["United Kingdom".to_string()],
            ..SchemeDetails::default()
        },
        principal_employer: PrincipalEmployer {
            company_name: "Acme Ltd".to_string(),
            registration_number: "01234567".to_string(),
            address: uk_address("2 Market Square", "SW1A 2AA"),
            incorporation_date: "01-02-2010".to_string(),
            registration_date: "01-02-2010".to_string(),
            trading_start_date: "March 2010".to_string(),
            management_persons: vec![ManagementPerson {
                first_name: "Jane".to_string(),
                surname: "Smith".to_string(),
                position: "Director".to_string(),
            }],
        },
        co_signatory: CoSignatory {
            firm_name: "Northgate Trustees Ltd".to_string(),
            contact_name: "Tom Brown".to_string(),
            address: uk_address("3 King Street", "M1 1AA"),
            phone_number: "00441612345678".to_string(),
            email: "tom@northgate.example.com".to_string(),
            regulator_reference: "FRN123456".to_string(),
        },
        account: AccountDetails {
            acknowledgement: true,
            account_types: vec!["BANK".to_string()],
            opening_balance: "£10,000".to_string(),
            funds_value: "£250,000".to_string(),
            funds_sources: vec!["EMPLOYER".to_string(), "TRANSFER".to_string()],
            funds_source_details: None,
            funds_origin_countries: vec!["United Kingdom".to_string()],
        },
    }
}

pub fn valid_individual() -> IndividualRecord {
    IndividualRecord {
        identity: IdentityDetails {
            pstr_id: "00123456RA".to_string(),
            employee_number: Some(1),
            title: "MS".to_string(),
            first_name: "Jane".to_string(),
            middle_name: None,
            surname: "Smith".to_string(),
            date_of_birth: "1980-04-02".to_string(),
            gender: "F".to_string(),
            nationality: "GB".to_string(),
            has_dual_nationality: false,
            second_nationality: None,
        },
        contact: IndividualContact {
            phone_number: "00442071234567".to_string(),
            mobile_number: "7700900123".to_string(),
            email: "jane@example.com".to_string(),
            employment_type: "DIRECTOR".to_string(),
            occupation: "Company director".to_string(),
            marketing_preferences: vec!["EMAIL".to_string()],
        },
        current_address: CurrentAddress {
            address: uk_address("10 Downing Street", "SW1A 2AA"),
            roles: AddressRoles {
                is_current_address: true,
                is_permanent_address: true,
                is_communication_address: true,
            },
            time_at_address: TimeAtAddress::new(5, 2),
        },
        previous_addresses: Vec::new(),
        communication_address: None,
        tax: TaxDetails {
            tax_countries: vec!["United Kingdom".to_string()],
            foreign_tax_id: None,
        },
    }
}

pub fn filled_previous_address() -> PreviousAddress {
    PreviousAddress {
        address: uk_address("4 Old Road", "N1 9GU"),
        time_at_address: TimeAtAddress::new(4, 0),
    }
}
