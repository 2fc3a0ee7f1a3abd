use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named record that tasks point to: client, project, product, tag,
/// status, collaborator, or user. One wire shape covers all seven kinds;
/// fields a kind doesn't use stay `None` and are skipped on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefEntity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Logo/avatar URL (clients, projects, products).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Users only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Users only; absent means a regular account.
    #[serde(rename = "isAdmin", skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl RefEntity {
    pub fn named(name: impl Into<String>) -> Self {
        RefEntity {
            id: None,
            name: name.into(),
            image: None,
            email: None,
            is_admin: None,
        }
    }

    pub fn admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}

/// The seven reference-entity kinds and everything that differs between
/// their management screens: endpoint path, labels, whether an image can
/// be attached, and whether the screen is reserved for admins. Keying the
/// screens off this table is what keeps them a single implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Client,
    Project,
    Product,
    Tag,
    Status,
    Collaborator,
    User,
}

impl RefKind {
    pub const ALL: [RefKind; 7] = [
        RefKind::Client,
        RefKind::Project,
        RefKind::Product,
        RefKind::Tag,
        RefKind::Status,
        RefKind::Collaborator,
        RefKind::User,
    ];

    /// API collection path. `/status` and `/colaboradores` are what the
    /// server actually serves; do not "fix" them.
    pub fn endpoint(self) -> &'static str {
        match self {
            RefKind::Client => "/clients",
            RefKind::Project => "/projects",
            RefKind::Product => "/products",
            RefKind::Tag => "/tags",
            RefKind::Status => "/status",
            RefKind::Collaborator => "/colaboradores",
            RefKind::User => "/users",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefKind::Client => "Clients",
            RefKind::Project => "Projects",
            RefKind::Product => "Products",
            RefKind::Tag => "Tags",
            RefKind::Status => "Statuses",
            RefKind::Collaborator => "Collaborators",
            RefKind::User => "Users",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            RefKind::Client => "client",
            RefKind::Project => "project",
            RefKind::Product => "product",
            RefKind::Tag => "tag",
            RefKind::Status => "status",
            RefKind::Collaborator => "collaborator",
            RefKind::User => "user",
        }
    }

    /// Whether entities of this kind carry an uploadable image.
    pub fn has_image(self) -> bool {
        matches!(self, RefKind::Client | RefKind::Project | RefKind::Product)
    }

    /// Whether the management screen is shown to admins only. A display
    /// gate: the server decides what actually succeeds.
    pub fn admin_only(self) -> bool {
        matches!(self, RefKind::User)
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for RefKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" | "clients" => Ok(RefKind::Client),
            "project" | "projects" => Ok(RefKind::Project),
            "product" | "products" => Ok(RefKind::Product),
            "tag" | "tags" => Ok(RefKind::Tag),
            "status" | "statuses" => Ok(RefKind::Status),
            "collaborator" | "collaborators" => Ok(RefKind::Collaborator),
            "user" | "users" => Ok(RefKind::User),
            other => Err(format!(
                "unknown reference kind '{}' (expected one of: client, project, \
                 product, tag, status, collaborator, user)",
                other
            )),
        }
    }
}

/// Resolve a user id to its display name, falling back to the raw id when
/// the user list doesn't know it (deleted account, foreign data).
pub fn user_display_name<'a>(users: &'a [RefEntity], user_id: &'a str) -> &'a str {
    users
        .iter()
        .find(|u| u.id.as_deref() == Some(user_id))
        .map(|u| u.name.as_str())
        .unwrap_or(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_mongo_id_and_admin_flag() {
        let json = r#"{"_id":"u1","name":"Ana","email":"ana@x.io","isAdmin":true}"#;
        let user: RefEntity = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert!(user.admin());

        let plain: RefEntity = serde_json::from_str(r#"{"_id":"c1","name":"Acme"}"#).unwrap();
        assert!(!plain.admin());
        let out = serde_json::to_value(&plain).unwrap();
        assert!(out.get("isAdmin").is_none());
        assert!(out.get("image").is_none());
    }

    #[test]
    fn kind_descriptor_table() {
        assert_eq!(RefKind::Collaborator.endpoint(), "/colaboradores");
        assert_eq!(RefKind::Status.endpoint(), "/status");
        assert!(RefKind::Product.has_image());
        assert!(!RefKind::Tag.has_image());
        assert!(RefKind::User.admin_only());
        assert!(!RefKind::Status.admin_only());
    }

    #[test]
    fn kind_parses_singular_and_plural() {
        assert_eq!("clients".parse::<RefKind>(), Ok(RefKind::Client));
        assert_eq!("Status".parse::<RefKind>(), Ok(RefKind::Status));
        assert!("widget".parse::<RefKind>().is_err());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let users = vec![RefEntity {
            id: Some("u1".into()),
            ..RefEntity::named("Ana")
        }];
        assert_eq!(user_display_name(&users, "u1"), "Ana");
        assert_eq!(user_display_name(&users, "u9"), "u9");
    }
}
