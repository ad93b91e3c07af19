//! Subscribe requests for the push endpoint.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestType {
    #[serde(rename = "sub")]
    Subscribe,
}

/// One subscribe request. The id is never matched against a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRequest {
    pub id: String,
    #[serde(rename = "reqType")]
    pub req_type: RequestType,
    #[serde(rename = "dataType")]
    pub channel: String,
}

impl SubscriptionRequest {
    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            req_type: RequestType::Subscribe,
            channel: channel.into(),
        }
    }
}

/// One request per channel, in input order. Channels are not validated
/// locally; the exchange rejects unknown ones.
pub fn build_requests(channels: &[String]) -> Vec<SubscriptionRequest> {
    channels.iter().map(SubscriptionRequest::subscribe).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_one_request_per_channel_in_order() {
        let channels: Vec<String> = ["BTC-USDT@trade", "ETH-USDT@trade", "SOL-USDT@depth20"]
            .into_iter()
            .map(String::from)
            .collect();

        let requests = build_requests(&channels);
        assert_eq!(requests.len(), channels.len());

        for (request, channel) in requests.iter().zip(&channels) {
            assert_eq!(&request.channel, channel);
            assert_eq!(request.req_type, RequestType::Subscribe);
        }

        let ids: HashSet<_> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), requests.len());
    }

    #[test]
    fn test_empty_channel_list() {
        assert!(build_requests(&[]).is_empty());
    }

    #[test]
    fn test_channel_copied_verbatim() {
        let requests = build_requests(&["not a real channel".to_string()]);
        assert_eq!(requests[0].channel, "not a real channel");
    }

    #[test]
    fn test_wire_format() {
        let request = SubscriptionRequest::subscribe("BTC-USDT@trade");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["id"], request.id.as_str());
        assert_eq!(json["reqType"], "sub");
        assert_eq!(json["dataType"], "BTC-USDT@trade");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
