use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct SensorsQuery {
    /// Site whose sensors are listed (required)
    pub site_id: Option<String>,
}
