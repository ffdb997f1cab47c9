use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Single origin allowed to make credentialed cross-origin requests.
    pub client_origin: String,
    /// Externally reachable base of this service, used in verification links.
    pub public_base_url: String,
    pub cookie_secure: bool,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "blog-auth-api".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "blog-auth-api-users".into()),
            ttl_minutes: env_parse("ACCESS_TOKEN_EXPIRES_IN").unwrap_or(15),
            refresh_ttl_minutes: env_parse("REFRESH_TOKEN_EXPIRES_IN").unwrap_or(60),
        };
        anyhow::ensure!(
            jwt.ttl_minutes > 0 && jwt.refresh_ttl_minutes > 0,
            "token lifetimes must be positive"
        );

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: env_parse("SMTP_PORT").unwrap_or(587),
                username: std::env::var("SMTP_USER").context("SMTP_USER must be set")?,
                password: std::env::var("SMTP_PASS").context("SMTP_PASS must be set")?,
                from: std::env::var("EMAIL_FROM").context("EMAIL_FROM must be set")?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            jwt,
            client_origin: std::env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            cookie_secure: env_parse("COOKIE_SECURE").unwrap_or(false),
            smtp,
        })
    }

    pub fn access_ttl_seconds(&self) -> i64 {
        self.jwt.ttl_minutes * 60
    }

    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.jwt.refresh_ttl_minutes * 60
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
