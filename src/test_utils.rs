//! Fixtures for HTTP-level tests: the real routes and middleware over in-memory stores.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, header};
use actix_web::test::TestRequest;
use actix_web::{App, web};

use crate::auth::jwt::generate_access_token;
use crate::config::Config;
use crate::routes::{self, Limiters};
use crate::service::{AttendanceService, RequestService};
use crate::store::memory::{MemoryAttendanceStore, MemoryRequestStore};

pub struct TestApp {
    pub config: Config,
    pub requests: web::Data<RequestService<MemoryRequestStore>>,
    pub attendance: web::Data<AttendanceService<MemoryAttendanceStore>>,
    limiters: Limiters,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::for_tests();
        let limiters = Limiters::from_config(&config).unwrap();
        let requests = RequestService::new(MemoryRequestStore::with_names(&[
            (1, "Jane Doe"),
            (7, "Sam Lee"),
        ]));
        let attendance =
            AttendanceService::new(MemoryAttendanceStore::default(), config.checkin_cutoff_hour);

        TestApp {
            config,
            requests: web::Data::new(requests),
            attendance: web::Data::new(attendance),
            limiters,
        }
    }

    /// Create an Actix web app wired like the server, minus the database.
    pub fn create_app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let config = self.config.clone();
        let limiters = self.limiters.clone();

        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(self.requests.clone())
            .app_data(self.attendance.clone())
            .configure(move |cfg| {
                routes::configure::<MemoryRequestStore, MemoryAttendanceStore>(
                    cfg, &config, &limiters,
                )
            })
    }

    /// A request carrying a session for `user_id` with the given role codes.
    pub fn request_as(&self, method: Method, uri: &str, user_id: u64, roles: &[&str]) -> TestRequest {
        let token = generate_access_token(
            user_id,
            roles.iter().map(|r| r.to_string()).collect(),
            &self.config.jwt_secret,
            self.config.access_token_ttl,
        )
        .unwrap();

        TestRequest::default()
            .method(method)
            .uri(uri)
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
    }
}
