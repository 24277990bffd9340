use std::collections::{BTreeMap, BTreeSet};

use crate::types::internal::{Permission, PermissionKey};

/// Category order used when listing the catalog
pub const CATEGORIES: &[&str] = &[
    "news", "events", "gallery", "contacts", "vereine", "images", "users", "audit",
];

macro_rules! permission {
    ($key:literal, $category:literal, $label:literal, $description:literal) => {
        Permission {
            key: PermissionKey::from_static($key),
            category: $category,
            label: $label,
            description: $description,
        }
    };
}

static PERMISSIONS: &[Permission] = &[
    permission!("news.view", "news", "News ansehen", "View news articles in the back-office"),
    permission!("news.create", "news", "News erstellen", "Create news articles"),
    permission!("news.edit", "news", "News bearbeiten", "Edit existing news articles"),
    permission!("news.delete", "news", "News löschen", "Delete news articles"),
    permission!("events.view", "events", "Termine ansehen", "View events"),
    permission!("events.create", "events", "Termine erstellen", "Create events"),
    permission!("events.edit", "events", "Termine bearbeiten", "Edit existing events"),
    permission!("events.delete", "events", "Termine löschen", "Delete events"),
    permission!("gallery.view", "gallery", "Galerie ansehen", "View gallery albums"),
    permission!("gallery.create", "gallery", "Galerie erstellen", "Create gallery albums and upload photos"),
    permission!("gallery.edit", "gallery", "Galerie bearbeiten", "Edit gallery albums"),
    permission!("gallery.delete", "gallery", "Galerie löschen", "Delete gallery albums and photos"),
    permission!("contacts.view", "contacts", "Kontakte ansehen", "View contact entries"),
    permission!("contacts.create", "contacts", "Kontakte erstellen", "Create contact entries"),
    permission!("contacts.edit", "contacts", "Kontakte bearbeiten", "Edit contact entries"),
    permission!("contacts.delete", "contacts", "Kontakte löschen", "Delete contact entries"),
    permission!("vereine.view", "vereine", "Vereine ansehen", "View Vereine (local organizations)"),
    permission!("vereine.create", "vereine", "Vereine erstellen", "Create Vereine"),
    permission!("vereine.edit", "vereine", "Vereine bearbeiten", "Edit Vereine"),
    permission!("vereine.delete", "vereine", "Vereine löschen", "Delete Vereine"),
    permission!("images.view", "images", "Bilder ansehen", "View uploaded images"),
    permission!("images.moderate", "images", "Bilder moderieren", "Approve or reject submitted images"),
    permission!("images.delete", "images", "Bilder löschen", "Delete uploaded images"),
    permission!("users.view", "users", "Benutzer ansehen", "View admin accounts and the permission catalog"),
    permission!("users.create", "users", "Benutzer erstellen", "Provision new admin accounts"),
    permission!("users.edit", "users", "Benutzer bearbeiten", "Change roles, permissions and passwords of admin accounts"),
    permission!("audit.view", "audit", "Protokoll ansehen", "View the audit log"),
];

/// Role with its default grants
///
/// Grants are either exact keys or `{resource}.*`, which expands to every
/// catalog key of that resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub grants: &'static [&'static str],
}

static ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: "super_admin",
        display_name: "Super-Administrator",
        grants: &[
            "news.*", "events.*", "gallery.*", "contacts.*", "vereine.*", "images.*", "users.*",
            "audit.*",
        ],
    },
    RoleDefinition {
        name: "admin",
        display_name: "Administrator",
        grants: &[
            "news.*", "events.*", "gallery.*", "contacts.*", "vereine.*", "images.*", "users.view",
            "audit.view",
        ],
    },
    RoleDefinition {
        name: "redakteur",
        display_name: "Redakteur",
        grants: &["news.*", "events.*", "gallery.*", "contacts.view", "images.view"],
    },
    RoleDefinition {
        name: "vereinsverwalter",
        display_name: "Vereinsverwalter",
        grants: &[
            "events.view", "events.create", "events.edit", "news.view", "news.create", "news.edit",
            "news.delete", "gallery.*",
        ],
    },
];

/// Static permission catalog and role defaults
///
/// Immutable for the process lifetime; `validate` runs once at boot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionCatalog;

impl PermissionCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn all(&self) -> &'static [Permission] {
        PERMISSIONS
    }

    /// Permissions grouped by category, in `CATEGORIES` order
    pub fn list_permissions_by_category(&self) -> Vec<(&'static str, Vec<&'static Permission>)> {
        CATEGORIES
            .iter()
            .map(|category| {
                let permissions = PERMISSIONS.iter().filter(|p| p.category == *category).collect();
                (*category, permissions)
            })
            .collect()
    }

    pub fn list_roles(&self) -> &'static [RoleDefinition] {
        ROLES
    }

    pub fn role(&self, name: &str) -> Option<&'static RoleDefinition> {
        ROLES.iter().find(|role| role.name == name)
    }

    /// Exact membership; the wildcard is not a catalog key
    pub fn contains(&self, key: &PermissionKey) -> bool {
        PERMISSIONS.iter().any(|p| &p.key == key)
    }

    /// Default permission set of a role; empty for unknown roles
    pub fn get_role_default_permissions(&self, role_name: &str) -> BTreeSet<PermissionKey> {
        match self.role(role_name) {
            Some(role) => role.grants.iter().flat_map(|grant| expand_grant(grant)).collect(),
            None => BTreeSet::new(),
        }
    }

    /// Boot-time self-check of the static tables
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = BTreeSet::new();
        for permission in PERMISSIONS {
            PermissionKey::parse(permission.key.as_str())
                .map_err(|e| format!("catalog entry {}: {}", permission.key, e))?;
            if permission.key.is_wildcard() {
                return Err("wildcard must not be a catalog entry".to_string());
            }
            if !CATEGORIES.contains(&permission.category) {
                return Err(format!("{} has unknown category {}", permission.key, permission.category));
            }
            if permission.key.resource() != permission.category {
                return Err(format!("{} is filed under category {}", permission.key, permission.category));
            }
            if !seen.insert(permission.key.clone()) {
                return Err(format!("duplicate catalog entry {}", permission.key));
            }
        }

        let mut role_names = BTreeSet::new();
        for role in ROLES {
            if !role_names.insert(role.name) {
                return Err(format!("duplicate role {}", role.name));
            }
            for grant in role.grants {
                if expand_grant(grant).is_empty() {
                    return Err(format!("role {} grants unknown permission {}", role.name, grant));
                }
            }
        }

        Ok(())
    }

    /// Key count per category, for startup logging
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        self.list_permissions_by_category()
            .into_iter()
            .map(|(category, permissions)| (category, permissions.len()))
            .collect()
    }
}

fn expand_grant(grant: &str) -> Vec<PermissionKey> {
    match grant.strip_suffix(".*") {
        Some(resource) => PERMISSIONS
            .iter()
            .filter(|p| p.key.resource() == resource)
            .map(|p| p.key.clone())
            .collect(),
        None => PERMISSIONS
            .iter()
            .filter(|p| p.key.as_str() == grant)
            .map(|p| p.key.clone())
            .collect(),
    }
}
