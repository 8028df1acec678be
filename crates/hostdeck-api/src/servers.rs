// Server and account endpoints
//
// The server list is user-scoped by default; root admins may pass
// `type=admin` to list every server on the panel.

use tracing::debug;
use uuid::Uuid;

use crate::client::PanelClient;
use crate::error::Error;
use crate::models::{
    AccountAttributes, Item, ListResponse, ServerAttributes, ServerScope, StatsAttributes,
};

impl PanelClient {
    /// List one page of servers.
    ///
    /// `GET /api/client?page={page}[&type=admin]`
    pub async fn list_servers(
        &self,
        page: u32,
        scope: ServerScope,
    ) -> Result<ListResponse<ServerAttributes>, Error> {
        let mut params = vec![("page", page.to_string())];
        if let Some(kind) = scope.query_value() {
            params.push(("type", kind.to_owned()));
        }
        debug!(page, ?scope, "listing servers");
        self.get_with_params("api/client", &params).await
    }

    /// Current resource usage for one server.
    ///
    /// `GET /api/client/servers/{uuid}/resources`
    pub async fn get_server_resources(&self, server: &Uuid) -> Result<StatsAttributes, Error> {
        let item: Item<StatsAttributes> = self
            .get(&format!("api/client/servers/{server}/resources"))
            .await?;
        Ok(item.attributes)
    }

    /// The authenticated account.
    ///
    /// `GET /api/client/account`
    pub async fn get_account(&self) -> Result<AccountAttributes, Error> {
        let item: Item<AccountAttributes> = self.get("api/client/account").await?;
        Ok(item.attributes)
    }
}
