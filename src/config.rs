use std::env;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expire_secs: i64,
    /// When set, the authenticated role is re-read from the store on every
    /// request instead of trusting the role baked into the token at login.
    pub revalidate_role: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tickethub.db".into());
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let jwt_expire_secs = env::var("JWT_EXPIRE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);
        let revalidate_role = env::var("JWT_REVALIDATE_ROLE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Config {
            port,
            database_url,
            jwt_secret,
            jwt_expire_secs,
            revalidate_role,
        }
    }
}
