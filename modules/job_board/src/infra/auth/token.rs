use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{Principal, UserType};
use crate::domain::ports::TokenService;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: Uuid,
    user_type: String,
    iat: i64,
    exp: i64,
}

/// HS256 bearer tokens signed with a shared secret.
pub struct JwtTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtTokens {
    pub fn new(secret: &str, ttl_secs: u64) -> anyhow::Result<Self> {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .with_context(|| format!("token lifetime of {ttl_secs}s is out of range"))?;
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }
}

impl TokenService for JwtTokens {
    fn issue(&self, principal: &Principal) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: principal.user_id,
            user_type: principal.user_type.as_str().to_owned(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .context("token expiry overflows")?
                .timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).context("failed to sign token")
    }

    fn verify(&self, token: &str) -> anyhow::Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .context("token rejected")?;
        let user_type: UserType = data.claims.user_type.parse()?;
        Ok(Principal {
            user_id: data.claims.user_id,
            user_type,
        })
    }
}
