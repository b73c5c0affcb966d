//! Role endpoints.
//!
//! Reads are cached; `create_role` and `update_role` drop every list page and
//! the changed role's detail entry before returning.

use app_shop_core::RoleId;
use app_shop_core::role::{CreateRole, Role, RoleListParams, RolePage, UpdateRole};
use reqwest::Method;
use serde::de::IgnoredAny;
use tracing::instrument;

use super::{ApiClient, ApiError, CacheKey, CacheValue};

impl ApiClient {
    /// One page of roles.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn roles(&self, token: &str, params: &RoleListParams) -> Result<RolePage, ApiError> {
        let key = CacheKey::RoleList(params.clone());
        if let Some(CacheValue::RoleList(page)) = self.cached(&key).await {
            return Ok(page);
        }

        let page: RolePage = self
            .send(Method::GET, "roles", &params.query_pairs(), Some(token), None)
            .await?;

        self.remember(key, CacheValue::RoleList(page.clone())).await;
        Ok(page)
    }

    /// One role by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the role does not exist.
    #[instrument(skip(self, token), fields(role_id = %id))]
    pub async fn role(&self, token: &str, id: &RoleId) -> Result<Role, ApiError> {
        let key = CacheKey::RoleDetail(id.clone());
        if let Some(CacheValue::RoleDetail(role)) = self.cached(&key).await {
            return Ok(*role);
        }

        let path = format!("roles/{}", urlencoding::encode(id.as_str()));
        let role: Option<Role> = self.send(Method::GET, &path, &[], Some(token), None).await?;
        let role = role.ok_or_else(|| ApiError::NotFound(format!("role {id}")))?;

        self.remember(key, CacheValue::RoleDetail(Box::new(role.clone())))
            .await;
        Ok(role)
    }

    /// Create a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the role (e.g. duplicate name).
    #[instrument(skip(self, token, body), fields(name = %body.name))]
    pub async fn create_role(&self, token: &str, body: &CreateRole) -> Result<(), ApiError> {
        let body = serde_json::to_value(body)?;
        let _: IgnoredAny = self
            .send(Method::POST, "roles", &[], Some(token), Some(&body))
            .await?;
        self.forget_roles(None);
        Ok(())
    }

    /// Rename a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change.
    #[instrument(skip(self, token, body), fields(role_id = %id, name = %body.name))]
    pub async fn update_role(
        &self,
        token: &str,
        id: &RoleId,
        body: &UpdateRole,
    ) -> Result<(), ApiError> {
        let path = format!("roles/{}", urlencoding::encode(id.as_str()));
        let body = serde_json::to_value(body)?;
        let _: IgnoredAny = self
            .send(Method::PUT, &path, &[], Some(token), Some(&body))
            .await?;
        self.forget_roles(Some(id));
        Ok(())
    }

    fn forget_roles(&self, changed: Option<&RoleId>) {
        let changed = changed.cloned();
        self.forget_where(move |key| key.is_stale_after_change_to(changed.as_ref()));
    }
}
