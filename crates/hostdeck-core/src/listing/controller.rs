// ── Entity list controller ──
//
// Owns which servers are displayed: the page number, the admin-scope
// flag (persisted per user), and the location string mirroring the page.
// Fetch results replace the page wholesale; failures leave page and
// scope untouched and surface one notification in the dashboard scope.

use std::sync::Arc;

use hostdeck_api::ServerScope;
use tracing::{debug, info, warn};

use super::location::Location;
use crate::error::CoreError;
use crate::model::{EntityPage, UserContext};
use crate::notify::Notifications;
use crate::poller::EntitySource;
use crate::preferences::PreferenceStore;

/// Notification scope for list fetch errors.
pub const FLASH_SCOPE: &str = "dashboard";

/// Preference key holding a user's admin-scope flag.
pub fn preference_key(user_id: u64) -> String {
    format!("{user_id}:show_all_servers")
}

pub struct EntityListController<S> {
    source: Arc<S>,
    user: UserContext,
    preferences: Arc<PreferenceStore>,
    notifications: Notifications,
    page_number: u32,
    admin_scope: bool,
    location: Location,
    page: Option<Arc<EntityPage>>,
}

impl<S: EntitySource> EntityListController<S> {
    /// Initial page comes from `initial`'s query; the admin flag is read
    /// once from the preference store. The location is normalized
    /// immediately (an invalid `?page=0` becomes `/`).
    pub fn new(
        source: Arc<S>,
        user: UserContext,
        preferences: Arc<PreferenceStore>,
        notifications: Notifications,
        initial: &Location,
    ) -> Self {
        let page_number = initial.page();
        let admin_scope = preferences.get(&preference_key(user.id), false);
        debug!(page_number, admin_scope, user = user.id, "list controller created");
        Self {
            source,
            user,
            preferences,
            notifications,
            page_number,
            admin_scope,
            location: Location::for_page(page_number),
            page: None,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// The persisted flag, regardless of privilege.
    pub fn admin_scope(&self) -> bool {
        self.admin_scope
    }

    /// Scope actually sent to the backend. The admin flag only counts for
    /// root admins.
    pub fn effective_scope(&self) -> ServerScope {
        if self.admin_scope && self.user.root_admin {
            ServerScope::Admin
        } else {
            ServerScope::Own
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Last successfully fetched page. `None` until the first fetch lands.
    pub fn page(&self) -> Option<&Arc<EntityPage>> {
        self.page.as_ref()
    }

    /// Change page and rewrite the location. Zero is treated as 1.
    /// Returns whether the page changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.page_number {
            return false;
        }
        self.page_number = page;
        self.location = Location::for_page(page);
        debug!(page, location = %self.location, "page changed");
        true
    }

    /// Flip and persist the admin flag. No-op for users without elevated
    /// privilege. Returns whether anything changed.
    pub fn toggle_admin_scope(&mut self) -> Result<bool, CoreError> {
        if !self.user.root_admin {
            debug!(user = self.user.id, "ignoring admin scope toggle for non-admin");
            return Ok(false);
        }
        let next = !self.admin_scope;
        if let Err(e) = self.preferences.set(&preference_key(self.user.id), &next) {
            warn!(error = %e, "cannot persist admin scope");
            self.notifications.clear_and_add_error(FLASH_SCOPE, &e);
            return Err(e);
        }
        self.admin_scope = next;
        info!(admin_scope = next, "admin scope toggled");
        Ok(true)
    }

    /// Fetch the current page.
    ///
    /// An empty page past the first resets to page 1 and fetches exactly
    /// once more.
    pub async fn refresh(&mut self) -> Result<Arc<EntityPage>, CoreError> {
        let requested = self.page_number;
        let page = self.fetch(requested).await?;

        if page.is_empty() && (page.pagination.current_page > 1 || requested > 1) {
            info!(requested, "page is empty, returning to the first page");
            self.set_page(1);
            let first = self.fetch(1).await?;
            return Ok(self.store(first));
        }
        Ok(self.store(page))
    }

    /// [`set_page`](Self::set_page) then [`refresh`](Self::refresh).
    pub async fn select_page(&mut self, page: u32) -> Result<Arc<EntityPage>, CoreError> {
        self.set_page(page);
        self.refresh().await
    }

    /// [`toggle_admin_scope`](Self::toggle_admin_scope), then refresh if the
    /// flag changed. Returns the new page when one was fetched.
    pub async fn toggle_scope_and_refresh(
        &mut self,
    ) -> Result<Option<Arc<EntityPage>>, CoreError> {
        if self.toggle_admin_scope()? {
            return self.refresh().await.map(Some);
        }
        Ok(None)
    }

    async fn fetch(&self, page: u32) -> Result<EntityPage, CoreError> {
        let scope = self.effective_scope();
        match self.source.list_servers(page, scope).await {
            Ok(result) => {
                self.notifications.clear(FLASH_SCOPE);
                debug!(
                    page,
                    ?scope,
                    items = result.items.len(),
                    total_pages = result.pagination.total_pages,
                    "server page fetched"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(page, ?scope, error = %e, "server list fetch failed");
                self.notifications.clear_and_add_error(FLASH_SCOPE, &e);
                Err(e)
            }
        }
    }

    fn store(&mut self, page: EntityPage) -> Arc<EntityPage> {
        let page = Arc::new(page);
        self.page = Some(Arc::clone(&page));
        page
    }
}
