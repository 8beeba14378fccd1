use super::broadcast_message;
use crate::error::SproutError;
use crate::shared::dispatch::dispatch_in_chunks;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use serde_json::Value;
use sprout_notify_api_structs::notify_all_users::{APIResponse, RequestBody};
use sprout_notify_domain::{DeliveryTicket, NotificationLog, NotificationLogType, ID};
use sprout_notify_infra::SproutContext;
use tracing::{error, info};

pub async fn notify_all_users_controller(
    ctx: web::Data<SproutContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, SproutError> {
    let body = body.into_inner();
    let usecase = NotifyAllUsersUseCase {
        title: body.title,
        body: body.body,
        data: body.data,
    };

    execute(usecase, &ctx)
        .await
        .map(|report| {
            HttpResponse::Ok().json(APIResponse::new(
                report.message.clone(),
                report.sent,
                &report.tickets,
                report.timestamp,
            ))
        })
        .map_err(SproutError::from)
}

/// One-off fan-out to every registered device. Carries no scheduling
/// state; only the dispatch pipeline is shared with the reminder sweep.
#[derive(Debug)]
pub struct NotifyAllUsersUseCase {
    pub title: String,
    pub body: String,
    pub data: Value,
}

#[derive(Debug)]
pub struct BroadcastReport {
    pub sent: usize,
    pub tickets: Vec<DeliveryTicket>,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyMessage,
    NoRecipients,
    StorageError,
}

impl From<UseCaseError> for SproutError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyMessage => Self::BadClientData("Title and body are required".into()),
            UseCaseError::NoRecipients => Self::NotFound("No registered users found".into()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for NotifyAllUsersUseCase {
    type Response = BroadcastReport;

    type Error = UseCaseError;

    const NAME: &'static str = "NotifyAllUsers";

    async fn execute(&mut self, ctx: &SproutContext) -> Result<Self::Response, Self::Error> {
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return Err(UseCaseError::EmptyMessage);
        }

        let now = ctx.sys.get_timestamp_millis();

        let users = ctx
            .repos
            .notification_users
            .find_all()
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        let targets = users
            .into_iter()
            .filter(|u| u.has_push_token())
            .collect::<Vec<_>>();
        if targets.is_empty() {
            return Err(UseCaseError::NoRecipients);
        }

        let messages = targets
            .iter()
            .map(|user| broadcast_message(user, &self.title, &self.body, &self.data))
            .collect::<Vec<_>>();
        let outcome = dispatch_in_chunks(&ctx.push, &messages, ctx.config.push_timeout).await;
        let sent = outcome.attempted.len();

        let log = NotificationLog {
            id: ID::new(),
            log_type: NotificationLogType::BroadcastAll,
            title: self.title.clone(),
            body: self.body.clone(),
            data: self.data.clone(),
            sent_at: now,
            recipients: sent as i64,
        };
        if let Err(e) = ctx.repos.notification_logs.insert(&log).await {
            error!("Error appending to the notification log: {:?}", e);
        }

        info!("Notification sent to {} users", sent);

        Ok(BroadcastReport {
            sent,
            tickets: outcome.tickets,
            message: format!("Notification sent to {} users", sent),
            timestamp: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sprout_notify_domain::NotificationUser;
    use sprout_notify_infra::{setup_context_inmemory, InMemoryPushGateway};
    use std::sync::Arc;

    fn usecase_factory(title: &str, body: &str) -> NotifyAllUsersUseCase {
        NotifyAllUsersUseCase {
            title: title.to_string(),
            body: body.to_string(),
            data: json!({ "screen": "plants" }),
        }
    }

    async fn insert_user(ctx: &SproutContext, push_token: &str) -> ID {
        let user_id = ID::new();
        ctx.repos
            .notification_users
            .insert(&NotificationUser {
                user_id: user_id.clone(),
                push_token: push_token.to_string(),
            })
            .await
            .unwrap();
        user_id
    }

    #[actix_web::main]
    #[test]
    async fn it_rejects_empty_title_or_body() {
        let ctx = setup_context_inmemory();

        let res = execute(usecase_factory("", "A body"), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::EmptyMessage);

        let res = execute(usecase_factory("A title", "  "), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::EmptyMessage);
    }

    #[actix_web::main]
    #[test]
    async fn it_requires_registered_recipients() {
        let ctx = setup_context_inmemory();

        let res = execute(usecase_factory("A title", "A body"), &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NoRecipients);
    }

    #[actix_web::main]
    #[test]
    async fn it_broadcasts_to_every_device_with_a_token() {
        let mut ctx = setup_context_inmemory();
        let gateway = Arc::new(InMemoryPushGateway::new(100));
        ctx.push = gateway.clone();

        let user_id = insert_user(&ctx, "ExponentPushToken[aaa]").await;
        insert_user(&ctx, "ExponentPushToken[bbb]").await;
        // Registered but tokenless: not a deliverable target
        insert_user(&ctx, "").await;

        let report = execute(usecase_factory("A title", "A body"), &ctx)
            .await
            .unwrap();
        assert_eq!(report.sent, 2);
        assert_eq!(report.tickets.len(), 2);

        let sent = gateway.sent_messages();
        assert_eq!(sent.len(), 2);
        let first = sent.iter().find(|m| m.to == "ExponentPushToken[aaa]").unwrap();
        assert_eq!(first.title, "A title");
        assert_eq!(first.data["screen"], "plants");
        assert_eq!(first.data["userId"], json!(user_id.as_string()));
    }
}
