use super::domain::{Nric, Project, ViewFilter};

/// Projects applicants are allowed to see and apply to.
pub fn visible_projects(projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter(|project| project.visible)
        .cloned()
        .collect()
}

/// All projects owned by the manager, irrespective of visibility.
pub fn manager_projects(projects: &[Project], manager: &Nric) -> Vec<Project> {
    projects
        .iter()
        .filter(|project| &project.manager == manager)
        .cloned()
        .collect()
}

/// Projects the officer has been approved to administer.
pub fn officer_projects(projects: &[Project], officer: &Nric) -> Vec<Project> {
    projects
        .iter()
        .filter(|project| project.approved_officers.contains(officer))
        .cloned()
        .collect()
}

/// Narrow a candidate set by room type and price bounds. With no room type,
/// a project matches when either room type satisfies the bounds. Filtering
/// never widens or alters eligibility.
pub fn filtered(projects: &[Project], filter: &ViewFilter) -> Vec<Project> {
    projects
        .iter()
        .filter(|project| matches_filter(project, filter))
        .cloned()
        .collect()
}

fn matches_filter(project: &Project, filter: &ViewFilter) -> bool {
    match filter.room_type {
        Some(room_type) => price_in_bounds(project.inventory(room_type).price, filter),
        None => {
            price_in_bounds(project.two_room.price, filter)
                || price_in_bounds(project.three_room.price, filter)
        }
    }
}

fn price_in_bounds(price: u32, filter: &ViewFilter) -> bool {
    filter.min_price.map_or(true, |min| price >= min)
        && filter.max_price.map_or(true, |max| price <= max)
}
