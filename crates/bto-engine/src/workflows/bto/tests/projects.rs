use super::common::{manager, nric, officer, project};
use crate::workflows::bto::domain::{FlatType, Project, ViewFilter};
use crate::workflows::bto::projects::{filtered, manager_projects, officer_projects, visible_projects};

fn sample_projects() -> Vec<Project> {
    let boss = manager().nric;
    let other_boss = nric("T5555555E");
    let mut hidden = project(2, "Kallang Vista", "2024-02-01", "2024-03-01", 3, false, &boss);
    hidden.two_room.price = 95_000;
    hidden.three_room.price = 150_000;

    let mut open = project(1, "Punggol Grove", "2024-01-01", "2024-02-01", 3, true, &boss);
    open.two_room.price = 120_000;
    open.three_room.price = 180_000;

    let mut staffed = project(3, "Yishun Glen", "2024-04-01", "2024-05-01", 2, true, &other_boss);
    staffed.two_room.price = 110_000;
    staffed.three_room.price = 210_000;
    staffed.approved_officers.push(officer().nric);

    vec![open, hidden, staffed]
}

#[test]
fn visible_projects_excludes_hidden() {
    let views = visible_projects(&sample_projects());
    let ids: Vec<u32> = views.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn manager_sees_own_projects_regardless_of_visibility() {
    let views = manager_projects(&sample_projects(), &manager().nric);
    let ids: Vec<u32> = views.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn officer_projects_require_approved_membership() {
    let views = officer_projects(&sample_projects(), &officer().nric);
    let ids: Vec<u32> = views.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3]);
}

#[test]
fn filter_with_room_type_checks_that_price_only() {
    let filter = ViewFilter {
        room_type: Some(FlatType::ThreeRoom),
        min_price: None,
        max_price: Some(200_000),
    };
    let ids: Vec<u32> = filtered(&sample_projects(), &filter)
        .iter()
        .map(|p| p.id)
        .collect();
    // Project 3's 2-Room is cheap but its 3-Room exceeds the cap.
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn filter_without_room_type_matches_either_price() {
    let filter = ViewFilter {
        room_type: None,
        min_price: Some(200_000),
        max_price: None,
    };
    let ids: Vec<u32> = filtered(&sample_projects(), &filter)
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![3]);
}

#[test]
fn absent_bounds_are_open() {
    let all = filtered(&sample_projects(), &ViewFilter::default());
    assert_eq!(all.len(), 3);
}
