/// Authentication primitives
///
/// - `password`: Argon2id hashing, verification, and random password issuance
/// - `jwt`: HS256 token creation and validation
/// - `middleware`: auth context carried through request extensions

pub mod jwt;
pub mod middleware;
pub mod password;
