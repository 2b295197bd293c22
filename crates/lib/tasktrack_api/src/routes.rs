//! Route path constants.

pub const GET_ROOT: &str = "/";
pub const GET_HEALTH: &str = "/health";

pub const POST_AUTH_REGISTER: &str = "/api/v1/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/v1/auth/login";
pub const GET_AUTH_ME: &str = "/api/v1/auth/me";

pub const TASKS: &str = "/api/v1/tasks";
pub const TASKS_SLASH: &str = "/api/v1/tasks/";
pub const TASKS_ID: &str = "/api/v1/tasks/{id}";

pub const USERS: &str = "/api/v1/users";
pub const USERS_SLASH: &str = "/api/v1/users/";
pub const USERS_ID: &str = "/api/v1/users/{id}";
