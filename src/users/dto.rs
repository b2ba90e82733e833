use serde::Deserialize;

/// Request body for account registration. Server-assigned fields
/// (id, verified flag, timestamps) have no writable counterpart here.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Request body for account self-update. Exactly these three fields are
/// writable; anything else in the body is rejected at deserialization.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Query parameters of the verification callback link.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub email: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rejects_read_only_fields() {
        let err = serde_json::from_value::<UpdateAccountRequest>(serde_json::json!({
            "first_name": "A",
            "email_verified": true
        }))
        .unwrap_err();
        assert!(err.to_string().contains("email_verified"));

        assert!(serde_json::from_value::<UpdateAccountRequest>(serde_json::json!({
            "email": "b@x.com"
        }))
        .is_err());
    }

    #[test]
    fn update_accepts_any_subset_of_writable_fields() {
        let req: UpdateAccountRequest =
            serde_json::from_value(serde_json::json!({ "last_name": "B" })).unwrap();
        assert!(req.first_name.is_none());
        assert_eq!(req.last_name.as_deref(), Some("B"));
        assert!(req.password.is_none());
    }
}
