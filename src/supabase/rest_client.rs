use async_trait::async_trait;
use chrono::SecondsFormat;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::auth_service::{read_session, SessionHandle};
use super::{error_message, ProfileRepository, SettingsRepository, TransactionRepository};
use crate::entity::{
    AppError, Identity, IdentityPatch, NewSwapTransaction, Setting, SwapTransaction,
    TransactionQuery, TransactionStatus,
};

const PROFILES: &str = "profiles";
const TRANSACTIONS: &str = "transactions";
const SETTINGS: &str = "settings";

type Params = Vec<(String, String)>;

fn param(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// Query parameters for a transaction listing.
pub(crate) fn transaction_params(query: &TransactionQuery) -> Params {
    let select = if query.with_customer {
        "*,profiles:user_id(full_name,email)"
    } else {
        "*"
    };

    let mut params = vec![param("select", select)];
    if let Some(user_id) = query.user_id {
        params.push(param("user_id", format!("eq.{}", user_id)));
    }
    if let Some(status) = query.status {
        params.push(param("status", format!("eq.{}", status)));
    }
    if let Some(since) = query.created_since {
        params.push(param(
            "created_at",
            format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ));
    }
    params.push(param("order", "created_at.desc"));
    if let Some(limit) = query.limit {
        params.push(param("limit", limit.to_string()));
    }
    params
}

/// Total from a `Content-Range` header such as `0-24/57` or `*/57`.
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

/// Data client for the backend's PostgREST endpoint
pub struct PostgrestClient {
    http_client: Client,
    base_url: String,
    anon_key: String,
    session: SessionHandle,
}

impl PostgrestClient {
    pub fn new(base_url: &str, anon_key: &str, session: SessionHandle) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session,
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        // Row-level security keys off the signed-in user's token
        let token = read_session(&self.session)
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone());

        self.http_client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn check(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Backend {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        entity: &'static str,
        params: &Params,
    ) -> Result<Vec<T>, AppError> {
        debug!("GET {} {:?}", table, params);
        let response = self.request(Method::GET, table).query(params).send().await?;
        let body = Self::check(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|source| AppError::Decode { entity, source })
    }

    async fn count(&self, table: &str, params: &Params) -> Result<u64, AppError> {
        let response = self
            .request(Method::HEAD, table)
            .query(params)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = Self::check(response).await?;

        response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| AppError::Backend {
                status: response.status().as_u16(),
                message: "Missing row count in response".to_string(),
            })
    }

    async fn write<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        table: &str,
        params: &Params,
        body: Option<&B>,
        prefer: &str,
    ) -> Result<(), AppError> {
        debug!("{} {} {:?}", method, table, params);
        let mut request = self
            .request(method, table)
            .query(params)
            .header("Prefer", prefer);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::check(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for PostgrestClient {
    async fn fetch_identity(&self, id: Uuid) -> Result<Identity, AppError> {
        let params = vec![
            param("select", "*"),
            param("id", format!("eq.{}", id)),
            param("limit", "1"),
        ];
        self.select::<Identity>(PROFILES, "profile", &params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("profile {}", id)))
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, AppError> {
        let params = vec![param("select", "*"), param("order", "created_at.desc")];
        self.select(PROFILES, "profile", &params).await
    }

    async fn update_identity(&self, id: Uuid, patch: &IdentityPatch) -> Result<(), AppError> {
        let params = vec![param("id", format!("eq.{}", id))];
        self.write(Method::PATCH, PROFILES, &params, Some(patch), "return=minimal")
            .await
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), AppError> {
        let params = vec![param("id", format!("eq.{}", id))];
        self.write::<()>(Method::DELETE, PROFILES, &params, None, "return=minimal")
            .await
    }

    async fn count_identities(&self) -> Result<u64, AppError> {
        self.count(PROFILES, &vec![param("select", "id")]).await
    }
}

#[async_trait]
impl TransactionRepository for PostgrestClient {
    async fn insert_transaction(&self, tx: &NewSwapTransaction) -> Result<(), AppError> {
        self.write(
            Method::POST,
            TRANSACTIONS,
            &Vec::new(),
            Some(std::slice::from_ref(tx)),
            "return=minimal",
        )
        .await
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<SwapTransaction>, AppError> {
        self.select(TRANSACTIONS, "transaction", &transaction_params(query))
            .await
    }

    async fn update_transaction_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<(), AppError> {
        let params = vec![param("id", format!("eq.{}", id))];
        let body = serde_json::json!({ "status": status });
        self.write(Method::PATCH, TRANSACTIONS, &params, Some(&body), "return=minimal")
            .await
    }

    async fn count_transactions(
        &self,
        status: Option<TransactionStatus>,
    ) -> Result<u64, AppError> {
        let mut params = vec![param("select", "id")];
        if let Some(status) = status {
            params.push(param("status", format!("eq.{}", status)));
        }
        self.count(TRANSACTIONS, &params).await
    }
}

#[async_trait]
impl SettingsRepository for PostgrestClient {
    async fn fetch_settings(&self, keys: Option<&[&str]>) -> Result<Vec<Setting>, AppError> {
        let mut params = vec![param("select", "*")];
        if let Some(keys) = keys {
            params.push(param("key", format!("in.({})", keys.join(","))));
        }
        self.select(SETTINGS, "setting", &params).await
    }

    async fn fetch_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        let params = vec![
            param("select", "*"),
            param("key", format!("eq.{}", key)),
            param("limit", "1"),
        ];
        Ok(self
            .select::<Setting>(SETTINGS, "setting", &params)
            .await?
            .into_iter()
            .next())
    }

    async fn upsert_settings(&self, settings: &[Setting]) -> Result<(), AppError> {
        self.write(
            Method::POST,
            SETTINGS,
            &Vec::new(),
            Some(settings),
            "resolution=merge-duplicates,return=minimal",
        )
        .await
    }
}
