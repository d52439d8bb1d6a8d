use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    #[schema(example = "s3cret")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    #[schema(example = json!(["EMPLOYEE"]))]
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Role codes as stored in the user directory.
    pub roles: Vec<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}
