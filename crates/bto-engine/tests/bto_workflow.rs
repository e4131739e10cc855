//! End-to-end scenarios for the BTO engine: applicant lifecycle, officer
//! registration lifecycle, HTTP routing, and CSV-backed session reload, all
//! driven through the public service facade.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use bto_engine::workflows::bto::domain::{
        Application, MaritalStatus, Nric, Project, Registration, Role, UnitInventory, User,
    };
    use bto_engine::workflows::bto::repository::{
        ApplicationRepository, ProjectRepository, RegistrationRepository, RepositoryError,
        UserRepository,
    };
    use bto_engine::workflows::bto::BtoService;

    pub(super) fn nric(raw: &str) -> Nric {
        Nric::parse(raw).expect("valid NRIC fixture")
    }

    pub(super) fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date fixture")
    }

    pub(super) fn user(raw: &str, age: u32, marital_status: MaritalStatus, role: Role) -> User {
        User {
            nric: nric(raw),
            name: format!("User {raw}"),
            password: "password".to_string(),
            age,
            marital_status,
            role,
            filter: None,
        }
    }

    pub(super) fn project(
        id: u32,
        name: &str,
        open: &str,
        close: &str,
        officer_slots: u8,
        visible: bool,
        manager: &Nric,
    ) -> Project {
        Project {
            id,
            name: name.to_string(),
            neighborhood: "Punggol".to_string(),
            two_room: UnitInventory {
                units: 50,
                price: 120_000,
            },
            three_room: UnitInventory {
                units: 30,
                price: 180_000,
            },
            open_date: date(open),
            close_date: date(close),
            officer_slots,
            pending_officers: Vec::new(),
            approved_officers: Vec::new(),
            visible,
            manager: manager.clone(),
        }
    }

    pub(super) struct MemoryRepo<T> {
        rows: Mutex<Vec<T>>,
    }

    impl<T: Clone> MemoryRepo<T> {
        pub(super) fn seeded(rows: Vec<T>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows),
            })
        }

        fn load(&self) -> Result<Vec<T>, RepositoryError> {
            Ok(self.rows.lock().expect("lock").clone())
        }

        fn save(&self, rows: &[T]) -> Result<(), RepositoryError> {
            *self.rows.lock().expect("lock") = rows.to_vec();
            Ok(())
        }
    }

    impl UserRepository for MemoryRepo<User> {
        fn load_all(&self) -> Result<Vec<User>, RepositoryError> {
            self.load()
        }

        fn save_all(&self, users: &[User]) -> Result<(), RepositoryError> {
            self.save(users)
        }
    }

    impl ProjectRepository for MemoryRepo<Project> {
        fn load_all(&self) -> Result<Vec<Project>, RepositoryError> {
            self.load()
        }

        fn save_all(&self, projects: &[Project]) -> Result<(), RepositoryError> {
            self.save(projects)
        }
    }

    impl ApplicationRepository for MemoryRepo<Application> {
        fn load_all(&self) -> Result<Vec<Application>, RepositoryError> {
            self.load()
        }

        fn save_all(&self, applications: &[Application]) -> Result<(), RepositoryError> {
            self.save(applications)
        }
    }

    impl RegistrationRepository for MemoryRepo<Registration> {
        fn load_all(&self) -> Result<Vec<Registration>, RepositoryError> {
            self.load()
        }

        fn save_all(&self, registrations: &[Registration]) -> Result<(), RepositoryError> {
            self.save(registrations)
        }
    }

    pub(super) type Service = BtoService<
        MemoryRepo<User>,
        MemoryRepo<Project>,
        MemoryRepo<Application>,
        MemoryRepo<Registration>,
    >;

    pub(super) fn build_service(users: Vec<User>, projects: Vec<Project>) -> Service {
        BtoService::load(
            MemoryRepo::seeded(users),
            MemoryRepo::seeded(projects),
            MemoryRepo::seeded(Vec::new()),
            MemoryRepo::seeded(Vec::new()),
        )
        .expect("service loads from seeded repositories")
    }
}

mod applicant_lifecycle {
    use super::common::*;
    use bto_engine::workflows::bto::domain::{ApplicationStatus, FlatType, MaritalStatus, Role};
    use bto_engine::workflows::bto::service::{EngineError, Rejection};

    #[test]
    fn single_applicant_applies_despite_zero_officer_slots() {
        let boss = user("S9876543D", 45, MaritalStatus::Married, Role::Manager);
        let service = build_service(
            vec![
                user("S1234567A", 36, MaritalStatus::Single, Role::Applicant),
                boss.clone(),
            ],
            vec![project(1, "Punggol Grove", "2024-01-01", "2024-02-01", 0, true, &boss.nric)],
        );

        let application = service
            .apply(&nric("S1234567A"), 1, FlatType::TwoRoom)
            .expect("officer slots are irrelevant to applicant eligibility");
        assert_eq!(application.status, ApplicationStatus::Pending);

        let error = service
            .apply(&nric("S1234567A"), 1, FlatType::TwoRoom)
            .expect_err("one active application per applicant");
        assert!(matches!(
            error,
            EngineError::Rejected(Rejection::AlreadyApplied)
        ));
    }
}

mod officer_lifecycle {
    use super::common::*;
    use bto_engine::workflows::bto::domain::{MaritalStatus, RegistrationStatus, Role};
    use bto_engine::workflows::bto::service::{Decision, EngineError, Rejection};

    #[test]
    fn approval_then_overlapping_registration_is_blocked() {
        let boss = user("S9876543D", 45, MaritalStatus::Married, Role::Manager);
        let duty_officer = user("T7654321C", 40, MaritalStatus::Married, Role::Officer);
        let service = build_service(
            vec![duty_officer.clone(), boss.clone()],
            vec![
                project(1, "Punggol Grove", "2024-01-01", "2024-01-31", 2, true, &boss.nric),
                project(2, "Yishun Glen", "2024-01-15", "2024-02-15", 2, true, &boss.nric),
            ],
        );

        let registration = service
            .register(&duty_officer.nric, 1)
            .expect("open project accepts registrations");
        assert_eq!(registration.status, RegistrationStatus::Pending);

        let approved = service
            .decide_registration(registration.id, &boss.nric, Decision::Approve)
            .expect("manager approves");
        assert_eq!(approved.status, RegistrationStatus::Approved);

        let staffed = service
            .officer_projects(&duty_officer.nric)
            .into_iter()
            .find(|p| p.id == 1)
            .expect("officer now administers project 1");
        assert_eq!(staffed.approved_officers, vec![duty_officer.nric.clone()]);
        assert!(staffed.pending_officers.is_empty());

        let error = service
            .register(&duty_officer.nric, 2)
            .expect_err("overlapping window is double-booking");
        assert!(matches!(
            error,
            EngineError::Rejected(Rejection::OverlappingPeriod)
        ));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use bto_engine::workflows::bto::bto_router;
    use bto_engine::workflows::bto::domain::{MaritalStatus, Role};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let boss = user("S9876543D", 45, MaritalStatus::Married, Role::Manager);
        let service = Arc::new(build_service(
            vec![
                user("S1234567A", 36, MaritalStatus::Single, Role::Applicant),
                boss.clone(),
            ],
            vec![
                project(1, "Punggol Grove", "2024-01-01", "2024-02-01", 3, true, &boss.nric),
                project(2, "Kallang Vista", "2024-03-01", "2024-04-01", 3, false, &boss.nric),
            ],
        ));
        bto_router(service)
    }

    async fn post_json(router: &axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
            .expect("request");
        let response = router.clone().oneshot(request).await.expect("dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json")
        };
        (status, value)
    }

    #[tokio::test]
    async fn apply_then_duplicate_over_http() {
        let router = build_router();
        let payload = json!({
            "applicant_nric": "S1234567A",
            "project_id": 1,
            "flat_type": "TWOROOM",
        });

        let (status, body) = post_json(&router, "/api/v1/applications", payload.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.get("id").and_then(Value::as_u64), Some(1));
        assert_eq!(
            body.get("status").and_then(Value::as_str),
            Some("PENDING")
        );

        let (status, body) = post_json(&router, "/api/v1/applications", payload).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("already"));
    }

    #[tokio::test]
    async fn project_listing_hides_invisible_projects() {
        let router = build_router();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/projects")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let listing: Value = serde_json::from_slice(&body).expect("json");
        let ids: Vec<u64> = listing
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|p| p.get("id").and_then(Value::as_u64))
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn price_filter_narrows_the_listing() {
        let router = build_router();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/projects?room_type=TWOROOM&max_price=100000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let listing: Value = serde_json::from_slice(&body).expect("json");
        assert!(listing.as_array().expect("array").is_empty());
    }

    #[tokio::test]
    async fn missing_application_is_not_found() {
        let router = build_router();
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/applications/99")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_nric_in_request_is_rejected() {
        let router = build_router();
        let (status, _) = post_json(
            &router,
            "/api/v1/applications",
            json!({
                "applicant_nric": "NOT-AN-NRIC",
                "project_id": 1,
                "flat_type": "TWOROOM",
            }),
        )
        .await;
        // Serde-level validation of the NRIC newtype fails the decode.
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

mod csv_sessions {
    use super::common::*;
    use bto_engine::workflows::bto::domain::{
        ApplicationStatus, FlatType, MaritalStatus, RegistrationStatus, Role,
    };
    use bto_engine::workflows::bto::service::Decision;
    use bto_engine::workflows::bto::{
        BtoService, CsvApplicationRepository, CsvProjectRepository, CsvRegistrationRepository,
        CsvUserRepository, ProjectRepository, UserRepository,
    };
    use std::sync::Arc;

    #[test]
    fn state_survives_across_sessions() {
        let dir = tempfile::tempdir().expect("temp dir");
        let boss = user("S9876543D", 45, MaritalStatus::Married, Role::Manager);

        let users = Arc::new(CsvUserRepository::new(dir.path().join("users.csv")));
        let projects = Arc::new(CsvProjectRepository::new(dir.path().join("projects.csv")));
        let applications = Arc::new(CsvApplicationRepository::new(
            dir.path().join("applications.csv"),
        ));
        let registrations = Arc::new(CsvRegistrationRepository::new(
            dir.path().join("registrations.csv"),
        ));

        users
            .save_all(&[
                user("S1234567A", 36, MaritalStatus::Single, Role::Applicant),
                user("T7654321C", 40, MaritalStatus::Married, Role::Officer),
                boss.clone(),
            ])
            .expect("users seeded");
        projects
            .save_all(&[project(1, "Punggol Grove", "2024-01-01", "2024-01-31", 2, true, &boss.nric)])
            .expect("projects seeded");

        {
            let service = BtoService::load(
                users.clone(),
                projects.clone(),
                applications.clone(),
                registrations.clone(),
            )
            .expect("first session loads");

            service
                .apply(&nric("S1234567A"), 1, FlatType::TwoRoom)
                .expect("application lands");
            let registration = service
                .register(&nric("T7654321C"), 1)
                .expect("registration lands");
            service
                .decide_registration(registration.id, &boss.nric, Decision::Approve)
                .expect("approval lands");
        }

        let service = BtoService::load(users, projects, applications, registrations)
            .expect("second session reloads the saved state");

        let application = service.application(1).expect("application reloaded");
        assert_eq!(application.status, ApplicationStatus::Pending);
        let registration = service.registration(1).expect("registration reloaded");
        assert_eq!(registration.status, RegistrationStatus::Approved);
        let staffed = service
            .officer_projects(&nric("T7654321C"))
            .pop()
            .expect("approved membership reloaded");
        assert_eq!(staffed.id, 1);
    }
}
