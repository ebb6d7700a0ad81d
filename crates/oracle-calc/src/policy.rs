use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OraclePolicyView {
    pub enabled: bool,
    pub currency_prefix: String,
    pub group_thousands: bool,
}

impl Default for OraclePolicyView {
    fn default() -> Self {
        Self {
            enabled: true,
            currency_prefix: "$".to_string(),
            group_thousands: true,
        }
    }
}
