//! Session user and role model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::RecordId;

/// Account role. The backend encodes it as `0` (member) or `1` (administrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Member,
    Admin,
}

impl Role {
    pub fn as_flag(&self) -> u8 {
        match self {
            Role::Member => 0,
            Role::Admin => 1,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Role::Member),
            1 => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }

    /// Admin area: user directory, teams, site content.
    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Pending queues are reviewed by peers, so every member may moderate.
    pub fn can_moderate(&self) -> bool {
        true
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_flag())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRole {
            Flag(u8),
            Text(String),
        }

        let flag = match RawRole::deserialize(deserializer)? {
            RawRole::Flag(flag) => flag,
            RawRole::Text(text) => text
                .trim()
                .parse::<u8>()
                .map_err(|_| serde::de::Error::custom(format!("invalid role: {}", text)))?,
        };
        Role::from_flag(flag).ok_or_else(|| serde::de::Error::custom(format!("invalid role: {}", flag)))
    }
}

/// The authenticated user as returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.can_administer()
    }
}

/// A lab member as listed in author pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: RecordId,
    pub name: String,
}

/// Credentials posted to `POST /user/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token", alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub user: Option<CurrentUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_number_and_string() {
        let admin: CurrentUser =
            serde_json::from_value(json!({ "id": 1, "name": "Ada", "email": "a@lab.fr", "role": 1 }))
                .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.is_admin());

        let member: CurrentUser =
            serde_json::from_value(json!({ "id": "2", "name": "Bob", "role": "0" })).unwrap();
        assert_eq!(member.role, Role::Member);
        assert_eq!(member.email, "");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: Result<CurrentUser, _> =
            serde_json::from_value(json!({ "id": 1, "name": "X", "role": 7 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_role_serializes_as_flag() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(Role::Member).unwrap(), json!(0));
    }

    #[test]
    fn test_login_response_aliases() {
        let resp: LoginResponse =
            serde_json::from_value(json!({ "access_token": "t0k" })).unwrap();
        assert_eq!(resp.token, "t0k");
        assert!(resp.user.is_none());
    }
}
