use crate::{error::AppError, model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// The authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: u64,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> Self {
        AuthUser {
            user_id: claims.user_id,
            roles: claims.roles.iter().filter_map(|r| Role::from_code(r)).collect(),
        }
    }

    /// Admin, HR and managers may decide on requests and read system-wide reports.
    pub fn require_approver(&self) -> Result<(), AppError> {
        if self.roles.iter().any(Role::can_approve) {
            Ok(())
        } else {
            Err(AppError::Forbidden("insufficient permission".into()))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("invalid user session".into()).into());

        ready(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use pretty_assertions::assert_eq;

    fn claims(roles: &[&str]) -> Claims {
        Claims {
            user_id: 42,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            iat: 0,
            exp: 0,
            jti: String::new(),
        }
    }

    #[test]
    fn unknown_role_codes_are_dropped() {
        let user = AuthUser::from_claims(&claims(&["EMPLOYEE", "INTERN", "hr"]));
        assert_eq!(user.roles, vec![Role::Employee, Role::Hr]);
    }

    #[test]
    fn approver_check() {
        assert!(AuthUser::from_claims(&claims(&["MANAGER"])).require_approver().is_ok());
        assert!(matches!(
            AuthUser::from_claims(&claims(&["EMPLOYEE"])).require_approver(),
            Err(AppError::Forbidden(_))
        ));
        assert!(AuthUser::from_claims(&claims(&[])).require_approver().is_err());
    }

    #[actix_web::test]
    async fn extractor_reads_extensions() {
        let req = TestRequest::default().to_http_request();
        assert!(AuthUser::extract(&req).await.is_err());

        let user = AuthUser::from_claims(&claims(&["ADMIN"]));
        req.extensions_mut().insert(user.clone());
        assert_eq!(AuthUser::extract(&req).await.unwrap(), user);
    }
}
