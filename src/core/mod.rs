// Domain-layer modules: records, schemas and shared errors
pub mod models {
    pub use crate::models::*;
}

pub mod validation {
    pub use crate::validation::*;
}

pub mod schemas {
    pub use crate::corporate_form::{corporate_schema, validate_corporate};
    pub use crate::individual_form::{
        individual_schema, validate_individual, IndividualValidationOptions,
    };
}

pub mod formatting {
    pub use crate::formatting::*;
}

pub mod errors {
    pub use crate::errors::*;
}
