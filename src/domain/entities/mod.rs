pub mod subscription;
pub mod user_role;
