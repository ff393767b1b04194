use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use db::models::ombudsman_ticket::Model as Ticket;
use db::repositories::UserDirectory;

use super::is_valid_id;

/// Maps responsible user ids to display names for a batch of tickets.
#[derive(Clone)]
pub struct ResponsibleResolver {
    directory: Arc<dyn UserDirectory>,
}

impl ResponsibleResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// One directory lookup for every distinct responsible id in `tickets`.
    ///
    /// Ids that are not UUIDs are left out of the lookup. A failing directory
    /// yields an empty map; names are decoration and never fail a read.
    pub async fn resolve(&self, tickets: &[Ticket]) -> HashMap<String, String> {
        let mut ids = BTreeSet::new();
        for id in tickets.iter().filter_map(|t| t.responsible_user_id.as_deref()) {
            if is_valid_id(id) {
                ids.insert(id.to_owned());
            } else {
                tracing::debug!(responsible_user_id = %id, "Skipping malformed responsible id");
            }
        }

        if ids.is_empty() {
            return HashMap::new();
        }

        let ids: Vec<String> = ids.into_iter().collect();
        match self.directory.display_names(&ids).await {
            Ok(names) => names
                .into_iter()
                .map(|entry| (entry.id, entry.display_name))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, count = ids.len(), "Responsible name lookup failed");
                HashMap::new()
            }
        }
    }
}
