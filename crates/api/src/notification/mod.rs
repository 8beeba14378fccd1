pub mod notify_all_users;
pub mod notify_users;
pub mod send_due_reminders;

use actix_web::web;
use notify_all_users::notify_all_users_controller;
use notify_users::notify_users_controller;
use send_due_reminders::run_reminder_sweep_controller;
use serde_json::Value;
use sprout_notify_domain::{NotificationUser, PushMessage};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/sweep",
        web::post().to(run_reminder_sweep_controller),
    );
    cfg.route("/notify/all", web::post().to(notify_all_users_controller));
    cfg.route("/notify/users", web::post().to(notify_users_controller));
}

/// Builds the push message for one broadcast recipient. The caller's data
/// payload is preserved and tagged with the recipient's user id.
pub(crate) fn broadcast_message(
    user: &NotificationUser,
    title: &str,
    body: &str,
    data: &Value,
) -> PushMessage {
    let mut payload = match data {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    payload.insert("userId".to_string(), Value::String(user.user_id.as_string()));

    PushMessage::new(
        user.push_token.clone(),
        title.to_string(),
        body.to_string(),
        Value::Object(payload),
    )
}
