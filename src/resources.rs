use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub aggregate: bool,
}

impl FieldSpec {
    const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            aggregate: false,
        }
    }

    const fn number(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Number,
            aggregate: false,
        }
    }

    const fn total(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Number,
            aggregate: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub singular: &'static str,
    pub path: &'static str,
    pub columns: &'static [FieldSpec],
    pub has_status: bool,
    pub editable: bool,
    pub roles: &'static [Role],
}

impl ResourceSpec {
    pub fn visible_to(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ALL_ROLES: &[Role] = &[Role::Admin, Role::Agent];

pub const RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        key: "categories",
        title: "Categories",
        singular: "category",
        path: "category",
        columns: &[
            FieldSpec::text("name", "Name"),
            FieldSpec::text("brand", "Brand"),
            FieldSpec::text("about", "About"),
        ],
        has_status: true,
        editable: true,
        roles: ADMIN_ONLY,
    },
    ResourceSpec {
        key: "brands",
        title: "Brands",
        singular: "brand",
        path: "brand",
        columns: &[
            FieldSpec::text("name", "Name"),
            FieldSpec::text("about", "About"),
        ],
        has_status: true,
        editable: true,
        roles: ADMIN_ONLY,
    },
    ResourceSpec {
        key: "policies",
        title: "Policies",
        singular: "policy",
        path: "policy",
        columns: &[
            FieldSpec::text("name", "Name"),
            FieldSpec::text("category", "Category"),
            FieldSpec::text("cover", "Cover"),
            FieldSpec::total("premium", "Premium"),
        ],
        has_status: true,
        editable: true,
        roles: ALL_ROLES,
    },
    ResourceSpec {
        key: "tax-records",
        title: "Tax Records",
        singular: "tax record",
        path: "tax",
        columns: &[
            FieldSpec::text("name", "Name"),
            FieldSpec::text("applies_to", "Applies To"),
            FieldSpec::number("rate", "Rate %"),
        ],
        has_status: true,
        editable: true,
        roles: ADMIN_ONLY,
    },
    ResourceSpec {
        key: "agent-assignments",
        title: "Agent Assignments",
        singular: "assignment",
        path: "assignment",
        columns: &[
            FieldSpec::text("agent", "Agent"),
            FieldSpec::text("policy", "Policy"),
            FieldSpec::text("region", "Region"),
        ],
        has_status: false,
        editable: true,
        roles: ADMIN_ONLY,
    },
    ResourceSpec {
        key: "feedback",
        title: "Feedback",
        singular: "feedback entry",
        path: "feedback",
        columns: &[
            FieldSpec::text("user", "User"),
            FieldSpec::text("message", "Message"),
            FieldSpec::number("rating", "Rating"),
        ],
        has_status: false,
        editable: false,
        roles: ALL_ROLES,
    },
    ResourceSpec {
        key: "commissions",
        title: "Commissions",
        singular: "commission",
        path: "commission",
        columns: &[
            FieldSpec::text("agent", "Agent"),
            FieldSpec::text("policy", "Policy"),
            FieldSpec::text("month", "Month"),
            FieldSpec::total("amount", "Amount"),
        ],
        has_status: false,
        editable: false,
        roles: ALL_ROLES,
    },
    ResourceSpec {
        key: "conversion-units",
        title: "Conversion Units",
        singular: "conversion unit",
        path: "conversion_unit",
        columns: &[
            FieldSpec::text("name", "Name"),
            FieldSpec::text("about", "About"),
            FieldSpec::number("factor", "Factor"),
        ],
        has_status: true,
        editable: true,
        roles: ADMIN_ONLY,
    },
    ResourceSpec {
        key: "sales-reports",
        title: "Sales Reports",
        singular: "sales report",
        path: "sales_report",
        columns: &[
            FieldSpec::text("period", "Period"),
            FieldSpec::total("policies_sold", "Policies Sold"),
            FieldSpec::total("revenue", "Revenue"),
        ],
        has_status: false,
        editable: false,
        roles: ALL_ROLES,
    },
];

pub fn find(key: &str) -> Option<&'static ResourceSpec> {
    RESOURCES.iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::{find, FieldKind, RESOURCES};
    use std::collections::BTreeSet;

    #[test]
    fn resource_keys_and_paths_are_unique() {
        let mut keys = BTreeSet::new();
        let mut paths = BTreeSet::new();
        for spec in RESOURCES {
            assert!(keys.insert(spec.key), "duplicate resource key {}", spec.key);
            assert!(
                paths.insert(spec.path),
                "duplicate resource path {}",
                spec.path
            );
        }
    }

    #[test]
    fn column_keys_are_unique_within_each_resource() {
        for spec in RESOURCES {
            let mut keys = BTreeSet::new();
            assert!(!spec.columns.is_empty(), "{} has no columns", spec.key);
            for column in spec.columns {
                assert!(
                    keys.insert(column.key),
                    "{} repeats column {}",
                    spec.key,
                    column.key
                );
                assert_ne!(column.key, "id", "{} shadows the id field", spec.key);
                assert_ne!(
                    column.key, "status",
                    "{} shadows the status field",
                    spec.key
                );
            }
        }
    }

    #[test]
    fn aggregates_only_mark_numeric_columns() {
        for spec in RESOURCES {
            for column in spec.columns {
                if column.aggregate {
                    assert_eq!(
                        column.kind,
                        FieldKind::Number,
                        "{}.{} aggregates a non-numeric column",
                        spec.key,
                        column.key
                    );
                }
            }
        }
    }

    #[test]
    fn every_resource_is_visible_to_at_least_one_role() {
        for spec in RESOURCES {
            assert!(!spec.roles.is_empty(), "{} is visible to nobody", spec.key);
        }
    }

    #[test]
    fn find_resolves_known_keys_only() {
        assert_eq!(find("categories").map(|spec| spec.path), Some("category"));
        assert!(find("does-not-exist").is_none());
    }
}
