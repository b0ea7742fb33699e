//! Profile domain module.
//!
//! - `model`: public/private profile halves and roles
//! - `age`: date of birth validation and the adult check

mod age;
mod model;

pub use age::{
    ADULT_AGE, DateOfBirth, calculate_age, calculate_age_on, is_adult, is_adult_on,
};
pub use model::{FullProfile, PrivateProfile, PublicProfile, StaffUserRecord, UserRole};
