use super::broadcast_message;
use super::notify_all_users::BroadcastReport;
use crate::error::SproutError;
use crate::shared::dispatch::dispatch_in_chunks;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use serde_json::Value;
use sprout_notify_api_structs::notify_users::{APIResponse, RequestBody};
use sprout_notify_domain::{NotificationLog, NotificationLogType, ID};
use sprout_notify_infra::SproutContext;
use tracing::{error, info};

pub async fn notify_users_controller(
    ctx: web::Data<SproutContext>,
    body: web::Json<RequestBody>,
) -> Result<HttpResponse, SproutError> {
    let body = body.into_inner();
    let usecase = NotifyUsersUseCase {
        user_ids: body.user_ids,
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

/// One-off fan-out to the registered devices of the given users
#[derive(Debug)]
pub struct NotifyUsersUseCase {
    pub user_ids: Vec<ID>,
    pub title: String,
    pub body: String,
    pub data: Value,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyUserIds,
    EmptyMessage,
    NoRecipients,
    StorageError,
}

impl From<UseCaseError> for SproutError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyUserIds => Self::BadClientData("User IDs array is required".into()),
            UseCaseError::EmptyMessage => Self::BadClientData("Title and body are required".into()),
            UseCaseError::NoRecipients => Self::NotFound("No users found with provided IDs".into()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for NotifyUsersUseCase {
    type Response = BroadcastReport;

    type Error = UseCaseError;

    const NAME: &'static str = "NotifyUsers";

    async fn execute(&mut self, ctx: &SproutContext) -> Result<Self::Response, Self::Error> {
        if self.user_ids.is_empty() {
            return Err(UseCaseError::EmptyUserIds);
        }
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return Err(UseCaseError::EmptyMessage);
        }

        let now = ctx.sys.get_timestamp_millis();

        let users = ctx
            .repos
            .notification_users
            .find_by_users(&self.user_ids)
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
            log_type: NotificationLogType::BroadcastUsers,
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
    async fn it_rejects_an_empty_user_id_list() {
        let ctx = setup_context_inmemory();

        let usecase = NotifyUsersUseCase {
            user_ids: Vec::new(),
            title: "A title".to_string(),
            body: "A body".to_string(),
            data: json!({}),
        };
        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::EmptyUserIds);
    }

    #[actix_web::main]
    #[test]
    async fn it_requires_known_recipients() {
        let ctx = setup_context_inmemory();
        insert_user(&ctx, "ExponentPushToken[aaa]").await;

        let usecase = NotifyUsersUseCase {
            user_ids: vec![ID::new()],
            title: "A title".to_string(),
            body: "A body".to_string(),
            data: json!({}),
        };
        let res = execute(usecase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::NoRecipients);
    }

    #[actix_web::main]
    #[test]
    async fn it_notifies_only_the_requested_users() {
        let mut ctx = setup_context_inmemory();
        let gateway = Arc::new(InMemoryPushGateway::new(100));
        ctx.push = gateway.clone();

        let picked = insert_user(&ctx, "ExponentPushToken[aaa]").await;
        insert_user(&ctx, "ExponentPushToken[bbb]").await;

        let usecase = NotifyUsersUseCase {
            user_ids: vec![picked],
            title: "A title".to_string(),
            body: "A body".to_string(),
            data: json!({}),
        };
        let report = execute(usecase, &ctx).await.unwrap();
        assert_eq!(report.sent, 1);

        let sent = gateway.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ExponentPushToken[aaa]");
    }
}
