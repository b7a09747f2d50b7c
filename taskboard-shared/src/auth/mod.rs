/// Authentication and authorization
///
/// - `jwt`: locally issued HS256 tokens (access + refresh)
/// - `password`: Argon2id password hashing
/// - `verifier`: pluggable token verification (local HS256 or Auth0 RS256),
///   producing a normalized [`verifier::Principal`]
/// - `authorization`: resource-level permission checks for projects and tasks

pub mod authorization;
pub mod jwt;
pub mod password;
pub mod verifier;
