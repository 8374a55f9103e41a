use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct TokenSettings {
    /// HMAC key for both token kinds. Usually supplied through `JWT_SECRET`.
    #[serde(default)]
    pub secret: String,
    pub access_token_lifetime_m: i64,
    pub refr_token_lifetime_d: i64,
}

impl TokenSettings {
    ///
    /// Expiry of an access token issued at `now`. `None` if the configured
    /// lifetime isn't positive, or the expiry can't be represented.
    ///
    pub fn access_token_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        expiry(now, Duration::try_minutes(self.access_token_lifetime_m))
    }

    ///
    /// Expiry of a refresh token issued at `now`, under the same rules as
    /// `access_token_expiry`
    ///
    pub fn refr_token_expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        expiry(now, Duration::try_days(self.refr_token_lifetime_d))
    }
}

fn expiry(now: DateTime<Utc>, lifetime: Option<Duration>) -> Option<DateTime<Utc>> {
    let lifetime = lifetime.filter(|lifetime| *lifetime > Duration::zero())?;
    now.checked_add_signed(lifetime)
}
