//! Blocking GraphQL client for the monday.com board API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::board::{BoardApi, ItemsPage, ItemsPageQuery};
use crate::error::{Result, SyncError};
use crate::models::ColumnValues;
use crate::settings::Settings;

const ITEMS_PAGE_QUERY: &str = "\
query ($boardId: ID!, $columnId: String!, $keys: [String]!, $cursor: String, $limit: Int!) {
  items_page_by_column_values(limit: $limit, board_id: $boardId, cursor: $cursor, columns: [{column_id: $columnId, column_values: $keys}]) {
    cursor
    items { id name column_values { id text } }
  }
}";

const CREATE_ITEM_MUTATION: &str = "\
mutation ($boardId: ID!, $itemName: String!, $columnValues: JSON!) {
  create_item(board_id: $boardId, item_name: $itemName, column_values: $columnValues) { id }
}";

const UPDATE_ITEM_MUTATION: &str = "\
mutation ($boardId: ID!, $itemId: ID!, $columnValues: JSON!) {
  change_multiple_column_values(board_id: $boardId, item_id: $itemId, column_values: $columnValues) { id }
}";

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Standard GraphQL envelope plus monday's top-level `error_message`.
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
    #[serde(default)]
    error_message: Option<String>,
}

impl<T> GraphQlResponse<T> {
    fn into_result(self) -> Result<T> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(SyncError::RemoteApplication(messages.join("; ")));
        }
        if let Some(message) = self.error_message {
            return Err(SyncError::RemoteApplication(message));
        }
        self.data
            .ok_or_else(|| SyncError::RemoteApplication("response carried no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ItemsPageData {
    items_page_by_column_values: ItemsPage,
}

#[derive(Debug, Deserialize)]
struct ItemRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateItemData {
    create_item: ItemRef,
}

#[derive(Debug, Deserialize)]
struct UpdateItemData {
    change_multiple_column_values: ItemRef,
}

/// The API takes `column_values` as a JSON document encoded in a string.
fn column_values_payload(column_values: &ColumnValues) -> Result<String> {
    Ok(serde_json::to_string(column_values)?)
}

fn items_page_variables(query: &ItemsPageQuery<'_>) -> Value {
    json!({
        "boardId": query.board_id.to_string(),
        "columnId": query.key_column_id,
        "keys": query.keys,
        "cursor": query.cursor,
        "limit": query.limit,
    })
}

fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: GraphQlResponse<T> = serde_json::from_str(body)?;
    envelope.into_result()
}

/// One HTTP client per sync run, reused for every call.
pub struct MondayClient {
    http: Client,
    endpoint: String,
    token: String,
    api_version: String,
}

impl MondayClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: settings.api_endpoint.clone(),
            token: settings.api_token.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        debug!("POST {} variables={variables}", self.endpoint);
        let body = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.token)
            .header(CONTENT_TYPE, "application/json")
            .header("API-Version", &self.api_version)
            .json(&json!({ "query": query, "variables": variables }))
            .send()?
            .error_for_status()?
            .text()?;
        parse_response(&body)
    }
}

impl BoardApi for MondayClient {
    fn items_page(&self, query: &ItemsPageQuery<'_>) -> Result<ItemsPage> {
        let data: ItemsPageData = self.execute(ITEMS_PAGE_QUERY, items_page_variables(query))?;
        Ok(data.items_page_by_column_values)
    }

    fn create_item(&self, board_id: u64, item_name: &str, column_values: &ColumnValues) -> Result<String> {
        let variables = json!({
            "boardId": board_id.to_string(),
            "itemName": item_name,
            "columnValues": column_values_payload(column_values)?,
        });
        let data: CreateItemData = self.execute(CREATE_ITEM_MUTATION, variables)?;
        Ok(data.create_item.id)
    }

    fn update_item(&self, board_id: u64, item_id: &str, column_values: &ColumnValues) -> Result<String> {
        let variables = json!({
            "boardId": board_id.to_string(),
            "itemId": item_id,
            "columnValues": column_values_payload(column_values)?,
        });
        let data: UpdateItemData = self.execute(UPDATE_ITEM_MUTATION, variables)?;
        Ok(data.change_multiple_column_values.id)
    }
}
