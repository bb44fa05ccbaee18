use serde::Deserialize;

pub(super) const USAGE: &str =
    "Use the following query http://localhost:8080/explore?requestUrl=https://dev.api.sokker.info";

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ExploreQuery {
    #[serde(rename = "requestUrl")]
    pub request_url: Option<String>,
}
