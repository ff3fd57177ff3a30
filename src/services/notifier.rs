//! Ticket event notifications.
//!
//! Each event renders its stored template and writes one in-app
//! notification per recipient. Delivery failures are logged and never fail
//! the ticket operation that triggered them.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{
    Notification, NotificationTemplate, Role, Ticket, TEMPLATE_TICKET_ASSIGNED,
    TEMPLATE_TICKET_CREATED, TEMPLATE_TICKET_STATUS_CHANGED,
};
use crate::error::DeskResult;
use crate::storage::DeskRepository;

#[derive(Clone)]
pub struct Notifier {
    repository: DeskRepository,
}

impl Notifier {
    pub fn new(repository: DeskRepository) -> Self {
        Self { repository }
    }

    /// New ticket: every active admin and manager except the reporter.
    pub async fn ticket_created(&self, ticket: &Ticket, branch_name: &str) {
        let result = async {
            let mut recipients = Vec::new();
            for role in [Role::Admin, Role::Manager] {
                for profile in self.repository.list_profiles(Some(role)).await? {
                    if profile.is_active && profile.id != ticket.reported_by {
                        recipients.push(profile.id);
                    }
                }
            }
            self.deliver(TEMPLATE_TICKET_CREATED, ticket, branch_name, &recipients)
                .await
        }
        .await;
        log_outcome(TEMPLATE_TICKET_CREATED, ticket, result);
    }

    pub async fn ticket_assigned(&self, ticket: &Ticket, branch_name: &str) {
        let Some(assignee) = ticket.assigned_to else {
            return;
        };
        let result = self
            .deliver(TEMPLATE_TICKET_ASSIGNED, ticket, branch_name, &[assignee])
            .await;
        log_outcome(TEMPLATE_TICKET_ASSIGNED, ticket, result);
    }

    /// Status change: reporter and assignee, minus whoever made the change.
    pub async fn ticket_status_changed(&self, ticket: &Ticket, branch_name: &str, actor: Uuid) {
        let mut recipients = vec![ticket.reported_by];
        if let Some(assignee) = ticket.assigned_to {
            if assignee != ticket.reported_by {
                recipients.push(assignee);
            }
        }
        recipients.retain(|id| *id != actor);

        let result = self
            .deliver(TEMPLATE_TICKET_STATUS_CHANGED, ticket, branch_name, &recipients)
            .await;
        log_outcome(TEMPLATE_TICKET_STATUS_CHANGED, ticket, result);
    }

    async fn deliver(
        &self,
        key: &str,
        ticket: &Ticket,
        branch_name: &str,
        recipients: &[Uuid],
    ) -> DeskResult<usize> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let template = match self.repository.find_template(key).await? {
            Some(t) => t,
            None => match NotificationTemplate::defaults().into_iter().find(|t| t.key == key) {
                Some(t) => t,
                None => return Ok(0),
            },
        };
        let (title, body) = template.render(&ticket_vars(ticket, branch_name));
        let url = format!("/tickets/{}", ticket.id);

        let mut sent = 0;
        for recipient in recipients {
            // Recipients may have been deleted since the ticket was loaded.
            if self.repository.find_profile(*recipient).await?.is_none() {
                continue;
            }
            let notification =
                Notification::new(*recipient, title.clone(), body.clone(), Some(url.clone()));
            self.repository.create_notification(&notification).await?;
            sent += 1;
        }
        Ok(sent)
    }
}

/// Variables available to ticket templates.
pub fn ticket_vars(ticket: &Ticket, branch_name: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        ("ticket_number", ticket.ticket_number.to_string()),
        ("title", ticket.title.clone()),
        ("branch_name", branch_name.to_string()),
        ("priority", ticket.priority.to_string()),
        ("status", ticket.status.to_string()),
    ])
}

fn log_outcome(key: &str, ticket: &Ticket, result: DeskResult<usize>) {
    match result {
        Ok(sent) => tracing::debug!(template = key, ticket_id = %ticket.id, sent, "Notifications written"),
        Err(e) => tracing::warn!(template = key, ticket_id = %ticket.id, error = %e, "Failed to write notifications"),
    }
}
