use serde::{Deserialize, Serialize};

///
/// Claims carried by an access token. Timestamps are seconds since the
/// UNIX epoch.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

///
/// Claims carried by a refresh token. `jti` is a random nonce, so two
/// tokens issued to the same user within the same second still differ.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: i64,
    pub jti: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

pub(super) trait TimeBound {
    fn nbf(&self) -> i64;
    fn exp(&self) -> i64;
}

impl TimeBound for AccessClaims {
    fn nbf(&self) -> i64 { self.nbf }
    fn exp(&self) -> i64 { self.exp }
}

impl TimeBound for RefreshClaims {
    fn nbf(&self) -> i64 { self.nbf }
    fn exp(&self) -> i64 { self.exp }
}
