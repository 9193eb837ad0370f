use reqwest::Client;
use serde_json::json;

use crate::codec::{self, ClarityValue, CodecError};
use crate::stats::QueryResponse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    Message(String),
    #[error("error status code {0}")]
    StatusCode(u16),
    #[error("unable to decode node response: {0}")]
    Decode(String),
    #[error("unable to encode arguments: {0}")]
    Codec(#[from] CodecError),
}

#[derive(Debug, Clone)]
pub struct StacksRpc {
    pub url: String,
    pub client: Client,
}

/// Body returned by `/v2/contracts/call-read`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyCallResult {
    pub okay: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
}

impl ReadOnlyCallResult {
    pub fn into_query_response(self) -> Result<QueryResponse, QueryError> {
        if !self.okay {
            let cause = self.cause.unwrap_or_else(|| "unknown error".to_string());
            return Ok(QueryResponse::Failed { cause });
        }
        let Some(result) = self.result else {
            return Err(QueryError::Decode("missing result".into()));
        };
        let value = codec::deserialize_hex(&result)
            .map_err(|e| QueryError::Decode(e.to_string()))?;
        Ok(QueryResponse::Okay(value))
    }
}

#[derive(Deserialize, Debug, Clone)]
struct LatestBlock {
    height: u64,
}

impl StacksRpc {
    pub fn new(url: &str) -> Self {
        Self { url: url.trim_end_matches('/').into(), client: Client::new() }
    }

    pub async fn call_read_only_fn(
        &self,
        contract_addr: &str,
        contract_name: &str,
        method: &str,
        args: &[ClarityValue],
        sender: &str,
    ) -> Result<QueryResponse, QueryError> {
        let path = format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.url, contract_addr, contract_name, method
        );

        let arguments = args
            .iter()
            .map(codec::serialize_to_hex)
            .collect::<Result<Vec<_>, _>>()?;
        let res = self
            .client
            .post(path)
            .json(&json!({
                "sender": sender,
                "arguments": arguments,
            }))
            .send()
            .await
            .map_err(|e| QueryError::Message(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let error = match res.text().await {
                Ok(message) if !message.is_empty() => QueryError::Message(message),
                _ => QueryError::StatusCode(status),
            };
            return Err(error);
        }

        let response: ReadOnlyCallResult =
            res.json().await.map_err(|e| QueryError::Decode(e.to_string()))?;
        response.into_query_response()
    }

    pub async fn get_block_height(&self) -> Result<u64, QueryError> {
        let request_url = format!("{}/extended/v2/blocks/latest", self.url);

        let res = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| QueryError::Message(e.to_string()))?;

        if !res.status().is_success() {
            return Err(QueryError::StatusCode(res.status().as_u16()));
        }

        let block: LatestBlock = res.json().await.map_err(|e| QueryError::Decode(e.to_string()))?;
        Ok(block.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_okay_result_is_decoded() {
        let body = r#"{"okay":true,"result":"0x0a0c00000002116c6173742d676d2d74696d657374616d70010000000000000000000000006553f10009746f74616c2d676d730100000000000000000000000000000005"}"#;
        let result: ReadOnlyCallResult = serde_json::from_str(body).unwrap();
        let QueryResponse::Okay(value) = result.into_query_response().unwrap() else {
            panic!("expected an evaluated call");
        };
        let expected = codec::some(
            codec::tuple([
                ("last-gm-timestamp", codec::uint(1_700_000_000u64)),
                ("total-gms", codec::uint(5u32)),
            ])
            .unwrap(),
        );
        assert_eq!(value, expected);
    }

    #[test]
    fn test_failed_result_keeps_cause() {
        let body = r#"{"okay":false,"cause":"Unchecked(NoSuchPublicFunction)"}"#;
        let result: ReadOnlyCallResult = serde_json::from_str(body).unwrap();
        assert_eq!(
            result.into_query_response().unwrap(),
            QueryResponse::Failed { cause: "Unchecked(NoSuchPublicFunction)".into() }
        );
    }

    #[test]
    fn test_malformed_results_are_errors() {
        let missing: ReadOnlyCallResult = serde_json::from_str(r#"{"okay":true}"#).unwrap();
        assert!(matches!(missing.into_query_response(), Err(QueryError::Decode(_))));

        let garbage: ReadOnlyCallResult =
            serde_json::from_str(r#"{"okay":true,"result":"0xff"}"#).unwrap();
        assert!(matches!(garbage.into_query_response(), Err(QueryError::Decode(_))));
    }

    #[test]
    fn test_url_is_normalized() {
        assert_eq!(StacksRpc::new("https://api.hiro.so/").url, "https://api.hiro.so");
    }
}
