/// Bot process configuration loaded from environment variables.
#[derive(Debug)]
pub struct BotConfig {
    /// Telegram Bot API token. Env var: `BOT_TOKEN`.
    pub bot_token: String,
    /// PostgreSQL connection URL. The same store the auth service uses.
    pub database_url: String,
}

impl BotConfig {
    pub fn from_env() -> Self {
        Self {
            bot_token: std::env::var("BOT_TOKEN").expect("BOT_TOKEN"),
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
        }
    }
}
