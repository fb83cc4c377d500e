use sea_orm::DatabaseConnection;
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, Contact, KeyboardButton, KeyboardMarkup, KeyboardRemove};
use uuid::Uuid;

use crate::domain::types::TelegramIdentity;
use crate::infra::db::{DbAuthRequestStore, DbUserStore};
use crate::usecase::link::{
    DeepLinkInput, DeepLinkOutcome, HandleDeepLinkUseCase, HandlePhoneSharedUseCase,
    PhoneSharedInput, PhoneSharedOutcome,
};

/// Shared dependencies injected into every update handler via dptree.
#[derive(Clone)]
pub struct BotContext {
    pub db: DatabaseConnection,
}

impl BotContext {
    fn auth_request_store(&self) -> DbAuthRequestStore {
        DbAuthRequestStore {
            db: self.db.clone(),
        }
    }

    fn user_store(&self) -> DbUserStore {
        DbUserStore {
            db: self.db.clone(),
        }
    }
}

const WELCOME: &str = "👋 Welcome! Open the app and tap \"Login with Telegram\" to start.";
const INVALID_REQUEST: &str = "❌ Invalid or expired login request. Please try again from the app.";
const SHARE_PHONE_PROMPT: &str = "👋 Hi! Share your phone number to finish signing in:";
const SHARE_PHONE_BUTTON: &str = "📱 Share phone number";
const OWN_CONTACT_ONLY: &str = "❌ Please share your own contact.";
const GENERIC_ERROR: &str = "❌ Something went wrong. Please try again.";

pub async fn handle_message(bot: Bot, msg: Message, ctx: BotContext) -> ResponseResult<()> {
    if let Some(contact) = msg.contact() {
        on_contact(&bot, &msg, &ctx, contact).await?;
    } else if let Some(text) = msg.text() {
        if let Some(payload) = text.strip_prefix("/start") {
            on_start(&bot, &msg, &ctx, payload.trim()).await?;
        }
    }
    Ok(())
}

async fn on_start(
    bot: &Bot,
    msg: &Message,
    ctx: &BotContext,
    payload: &str,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        bot.send_message(msg.chat.id, WELCOME).await?;
        return Ok(());
    };
    // A bare /start (or a mangled payload) is just a greeting.
    let Ok(request_id) = payload.parse::<Uuid>() else {
        bot.send_message(msg.chat.id, WELCOME).await?;
        return Ok(());
    };

    let usecase = HandleDeepLinkUseCase {
        auth_requests: ctx.auth_request_store(),
        users: ctx.user_store(),
    };
    let identity = TelegramIdentity {
        telegram_id: from.id.0.to_string(),
        first_name: from.first_name.clone(),
        last_name: from.last_name.clone(),
        username: from.username.clone(),
    };
    let first_name = from.first_name.clone();

    let outcome = usecase
        .execute(DeepLinkInput {
            request_id,
            identity,
        })
        .await;

    match outcome {
        Ok(DeepLinkOutcome::InvalidRequest) => {
            bot.send_message(msg.chat.id, INVALID_REQUEST).await?;
        }
        Ok(DeepLinkOutcome::PhoneNeeded) => {
            let keyboard = KeyboardMarkup::new([[
                KeyboardButton::new(SHARE_PHONE_BUTTON).request(ButtonRequest::Contact)
            ]])
            .resize_keyboard()
            .one_time_keyboard();
            bot.send_message(msg.chat.id, SHARE_PHONE_PROMPT)
                .reply_markup(keyboard)
                .await?;
        }
        Ok(DeepLinkOutcome::Completed) => {
            bot.send_message(
                msg.chat.id,
                format!("✅ Signed in, {first_name}! You can return to the app now."),
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
        }
        Err(e) => {
            tracing::error!(error = %e, "deep link handling failed");
            bot.send_message(msg.chat.id, GENERIC_ERROR).await?;
        }
    }
    Ok(())
}

async fn on_contact(
    bot: &Bot,
    msg: &Message,
    ctx: &BotContext,
    contact: &Contact,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    if contact.user_id != Some(from.id) {
        bot.send_message(msg.chat.id, OWN_CONTACT_ONLY).await?;
        return Ok(());
    }

    let usecase = HandlePhoneSharedUseCase {
        auth_requests: ctx.auth_request_store(),
        users: ctx.user_store(),
    };

    match usecase
        .execute(PhoneSharedInput {
            telegram_id: from.id.0.to_string(),
            phone: contact.phone_number.clone(),
        })
        .await
    {
        Ok(PhoneSharedOutcome::Completed) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "✅ Thanks! Your number ({}) is saved. You are signed in now.",
                    contact.phone_number
                ),
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
        }
        Ok(PhoneSharedOutcome::Saved | PhoneSharedOutcome::UnknownUser) => {
            bot.send_message(
                msg.chat.id,
                format!("✅ Thanks! Your number ({}) is saved.", contact.phone_number),
            )
            .reply_markup(KeyboardRemove::new())
            .await?;
        }
        Err(e) => {
            tracing::error!(error = %e, "phone share handling failed");
            bot.send_message(msg.chat.id, GENERIC_ERROR).await?;
        }
    }
    Ok(())
}
