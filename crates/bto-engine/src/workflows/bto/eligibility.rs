use std::collections::BTreeSet;

use super::domain::{FlatType, MaritalStatus, User};

/// Flat types a user may apply for, derived purely from marital status and
/// age. Singles qualify for 2-Room only from age 35; married applicants
/// qualify for both from age 21. Everyone else qualifies for nothing, which
/// callers report as an ineligibility outcome rather than an error.
pub fn eligible_flat_types(user: &User) -> BTreeSet<FlatType> {
    let mut types = BTreeSet::new();

    match user.marital_status {
        MaritalStatus::Single if user.age >= 35 => {
            types.insert(FlatType::TwoRoom);
        }
        MaritalStatus::Married if user.age >= 21 => {
            types.insert(FlatType::TwoRoom);
            types.insert(FlatType::ThreeRoom);
        }
        _ => {}
    }

    types
}
