use serde::{Deserialize, Serialize};

/// Status code the service returns on a successful call.
pub const CODE_SUCCESS: &str = "Success";

/// Status code the service returns when the bearer token is rejected.
pub const CODE_AUTHORIZE_FAILED: &str = "AuthorizeFailed";

/// One AutoDL account as stored and transmitted.
///
/// `password` is always the hex digest of the raw secret, never the text the
/// user typed. An empty field means "not configured yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Whether both halves of the pair have been set.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Body of the first login step.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
    pub v_code: String,
    pub phone_area: String,
    pub picture_id: Option<serde_json::Value>,
}

impl LoginRequest {
    /// Build the fixed-shape login body the service expects.
    pub fn new(username: &str, hashed_password: &str) -> Self {
        Self {
            phone: username.to_string(),
            password: hashed_password.to_string(),
            v_code: String::new(),
            phone_area: "+86".to_string(),
            picture_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: LoginData,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub ticket: String,
}

/// Body of the second login step: exchange the short-lived ticket for a
/// durable bearer token.
#[derive(Debug, Serialize)]
pub struct PassportRequest {
    pub ticket: String,
}

#[derive(Debug, Deserialize)]
pub struct PassportResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: PassportData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PassportData {
    #[serde(default)]
    pub token: String,
}

/// Instance list query. The client always asks for the first page of ten
/// with no filters.
#[derive(Debug, Serialize)]
pub struct InstanceRequest {
    pub date_from: String,
    pub date_to: String,
    pub page_index: i32,
    pub page_size: i32,
    pub status: Vec<String>,
    pub charge_type: Vec<String>,
}

impl InstanceRequest {
    pub fn first_page() -> Self {
        Self {
            date_from: String::new(),
            date_to: String::new(),
            page_index: 1,
            page_size: 10,
            status: Vec::new(),
            charge_type: Vec::new(),
        }
    }
}

/// A rented GPU machine allocation.
///
/// Fetched fresh on every query, never cached. The service controls the
/// idle/total relationship; the client only displays it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Instance {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub region_name: String,
    #[serde(default)]
    pub machine_alias: String,
    #[serde(default)]
    pub gpu_all_num: i32,
    #[serde(default)]
    pub gpu_idle_num: i32,
    #[serde(default)]
    pub stopped_at: StoppedAt,
}

/// Wrapper the service uses around nullable stop timestamps.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoppedAt {
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct InstanceResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: InstanceList,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstanceList {
    #[serde(default)]
    pub list: Vec<Instance>,
}

/// Body of the power-on / power-off calls.
#[derive(Debug, Serialize)]
pub struct PowerRequest {
    pub instance_uuid: String,
}

#[derive(Debug, Deserialize)]
pub struct PowerResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
}

#[derive(Debug, Deserialize)]
pub struct WalletResponse {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: WalletData,
}

#[derive(Debug, Default, Deserialize)]
pub struct WalletData {
    #[serde(default)]
    pub assets: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_has_fixed_shape() {
        let req = LoginRequest::new("18900000000", "digest");
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["phone"], "18900000000");
        assert_eq!(value["password"], "digest");
        assert_eq!(value["v_code"], "");
        assert_eq!(value["phone_area"], "+86");
        assert!(value["picture_id"].is_null());
    }

    #[test]
    fn instance_request_is_first_page_of_ten() {
        let req = InstanceRequest::first_page();
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["page_index"], 1);
        assert_eq!(value["page_size"], 10);
        assert_eq!(value["date_from"], "");
        assert!(value["status"].as_array().unwrap().is_empty());
        assert!(value["charge_type"].as_array().unwrap().is_empty());
    }

    #[test]
    fn instance_response_tolerates_missing_fields() {
        // Error responses carry no data; instances may omit fields.
        let resp: InstanceResponse =
            serde_json::from_str(r#"{"code":"AuthorizeFailed","msg":"expired"}"#).unwrap();
        assert_eq!(resp.code, CODE_AUTHORIZE_FAILED);
        assert_eq!(resp.msg, "expired");
        assert!(resp.data.list.is_empty());

        let resp: InstanceResponse = serde_json::from_str(
            r#"{"code":"Success","msg":"","data":{"list":[{"machine_alias":"m1","region_name":"r1","gpu_all_num":4,"gpu_idle_num":2}]}}"#,
        )
        .unwrap();
        assert_eq!(resp.code, CODE_SUCCESS);
        assert_eq!(resp.data.list.len(), 1);
        let inst = &resp.data.list[0];
        assert_eq!(inst.gpu_all_num, 4);
        assert_eq!(inst.gpu_idle_num, 2);
        assert!(inst.uuid.is_empty());
        assert!(inst.stopped_at.time.is_empty());
    }

    #[test]
    fn credentials_completeness() {
        let mut creds = Credentials::default();
        assert!(!creds.is_complete());
        creds.username = "18900000000".to_string();
        assert!(!creds.is_complete());
        creds.password = "digest".to_string();
        assert!(creds.is_complete());
    }
}
