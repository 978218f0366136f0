// Thin namespace wrapper for the controllers a UI binds to
pub mod corporate_form {
    pub use crate::corporate_form::{update, CorporateEvent, CorporateFormController};
}

pub mod individual_form {
    pub use crate::individual_form::{
        update, IndividualEvent, IndividualFormController, IndividualFormState,
    };
}

pub mod visibility {
    pub use crate::visibility::*;
}
