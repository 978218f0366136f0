//! Conditional sections of the individual form.
//!
//! Each section is a two-state machine (hidden/visible) whose state is a pure
//! function of one upstream input. The form controller only re-evaluates a
//! section when that input changed, and only touches the draft when the
//! derived state actually flips.

use crate::models::{Address, IndividualRecord, PreviousAddress, TimeAtAddress};
use serde::{Deserialize, Serialize};

/// Below this many months at the current address, address history is needed.
pub const ADDRESS_HISTORY_MONTHS: i64 = 36;

/// Most previous addresses a form may hold.
pub const MAX_PREVIOUS_ADDRESSES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    PreviousAddresses,
    CommunicationAddress,
    SecondNationality,
}

/// Current state of every conditional section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub previous_addresses: bool,
    pub communication_address: bool,
    pub second_nationality: bool,
}

impl Visibility {
    /// Derives every section from a draft.
    pub fn derive(draft: &IndividualRecord) -> Self {
        Self {
            previous_addresses: requires_previous_addresses(&draft.current_address.time_at_address),
            communication_address: requires_communication_address(
                draft.current_address.roles.is_communication_address,
            ),
            second_nationality: requires_second_nationality(draft.identity.has_dual_nationality),
        }
    }

    pub fn is_visible(&self, section: Section) -> bool {
        match section {
            Section::PreviousAddresses => self.previous_addresses,
            Section::CommunicationAddress => self.communication_address,
            Section::SecondNationality => self.second_nationality,
        }
    }

    pub(crate) fn set(&mut self, section: Section, visible: bool) {
        match section {
            Section::PreviousAddresses => self.previous_addresses = visible,
            Section::CommunicationAddress => self.communication_address = visible,
            Section::SecondNationality => self.second_nationality = visible,
        }
    }
}

/// Fewer than 36 months at the current address needs address history.
/// Nothing is required until a duration has been entered.
pub fn requires_previous_addresses(time: &TimeAtAddress) -> bool {
    time.total_months()
        .is_some_and(|months| months < ADDRESS_HISTORY_MONTHS)
}

/// A distinct communication address is needed when the current address is
/// not the communication address.
pub fn requires_communication_address(is_communication_address: bool) -> bool {
    !is_communication_address
}

pub fn requires_second_nationality(has_dual_nationality: bool) -> bool {
    has_dual_nationality
}

/// Applies a previous-address section flip to the draft. Showing guarantees
/// at least one (empty) entry; hiding clears the list.
pub(crate) fn apply_previous_addresses(draft: &mut IndividualRecord, visible: bool) {
    if visible {
        if draft.previous_addresses.is_empty() {
            draft.previous_addresses.push(PreviousAddress::default());
        }
    } else {
        draft.previous_addresses.clear();
    }
}

/// Allocates an empty communication address when shown, discards it when hidden.
pub(crate) fn apply_communication_address(draft: &mut IndividualRecord, visible: bool) {
    if visible {
        draft
            .communication_address
            .get_or_insert_with(Address::default);
    } else {
        draft.communication_address = None;
    }
}

/// Hiding the second nationality clears any value already entered.
pub(crate) fn apply_second_nationality(draft: &mut IndividualRecord, visible: bool) {
    if !visible {
        draft.identity.second_nationality = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_address_threshold() {
        assert!(!requires_previous_addresses(&TimeAtAddress::default()));
        assert!(requires_previous_addresses(&TimeAtAddress::new(0, 0)));
        assert!(requires_previous_addresses(&TimeAtAddress::new(2, 11)));
        assert!(!requires_previous_addresses(&TimeAtAddress::new(3, 0)));
        assert!(!requires_previous_addresses(&TimeAtAddress::new(10, 5)));
    }

    #[test]
    fn test_communication_polarity() {
        assert!(!requires_communication_address(true));
        assert!(requires_communication_address(false));
    }

    #[test]
    fn test_derive_from_default_draft() {
        let visibility = Visibility::derive(&IndividualRecord::default());
        assert!(!visibility.previous_addresses);
        assert!(visibility.communication_address);
        assert!(!visibility.second_nationality);
    }

    #[test]
    fn test_apply_previous_addresses_keeps_existing_entries() {
        let mut draft = IndividualRecord::default();
        apply_previous_addresses(&mut draft, true);
        assert_eq!(draft.previous_addresses.len(), 1);

        draft.previous_addresses[0].address.postcode = "AB1 2CD".into();
        apply_previous_addresses(&mut draft, true);
        assert_eq!(draft.previous_addresses.len(), 1);
        assert_eq!(draft.previous_addresses[0].address.postcode, "AB1 2CD");

        apply_previous_addresses(&mut draft, false);
        assert!(draft.previous_addresses.is_empty());
    }
}
