pub mod error;
pub mod jwt;
pub mod password;
pub mod roles;
pub mod service;
pub mod users;

pub use error::{AuthError, Result};
pub use jwt::{Claims, JwtService};
pub use roles::RoleService;
pub use service::{
    AuthService, RoleView, SignInOutcome, SignInRequest, SignInResponse, StatusResponse,
};
pub use users::UserService;
