use sea_orm::Database;
use teloxide::prelude::*;
use tracing::info;

use kitob_bot::config::BotConfig;
use kitob_bot::handlers::{BotContext, handle_message};

#[tokio::main]
async fn main() {
    kitob_core::tracing::init_tracing();

    let config = BotConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let bot = Bot::new(config.bot_token);
    let ctx = BotContext { db };

    info!("telegram bot starting");
    Dispatcher::builder(bot, Update::filter_message().endpoint(handle_message))
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
