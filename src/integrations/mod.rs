//! External collaborators.

pub mod submission {
    pub use crate::submission::*;
}

pub mod reference_data {
    pub use crate::reference_data::*;
}
